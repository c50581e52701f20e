//! Comprehensive tests for domain_party

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;

use core_kernel::{
    CodeEnum, DomainPort, HealthCheckResult, HealthCheckable, MandateId, NumericCodeEnum, Page,
    PageRequest, PartyId, PortError, SortDirection, TenantId,
};

use domain_party::address::PhysicalAddress;
use domain_party::association::Association;
use domain_party::codes::{
    ConstraintType, EntityType, MeasurementSystem, MeasurementUnitType, PartyType,
    RequiredMandataries, ValueType,
};
use domain_party::contact::ContactMechanism;
use domain_party::document::IdentityDocument;
use domain_party::keys::{
    ContactMechanismId, IdentityDocumentId, MandataryId, ReferenceKey, RoleTypeAttributeConstraintId,
    TaxNumberId,
};
use domain_party::mandate::Mandate;
use domain_party::party::{Organization, Person};
use domain_party::ports::mock::{MockPartyStore, MockReferenceDataPort};
use domain_party::ports::{
    AssociationPort, OrganizationPort, PartyPort, PersonPort, ReferenceDataPortExt, SnapshotPort,
};
use domain_party::snapshot::Snapshot;
use domain_party::reference::{Catalogue, Gender, ReferenceRecord, SortIndexOrder, Title};
use domain_party::{PartyConfig, PartyError, PartyPorts, PartyService};

// ============================================================================
// Code enumerations
// ============================================================================

mod code_tests {
    use super::*;

    fn all_codes<E: CodeEnum>() -> Vec<&'static str> {
        E::values().iter().map(|v| v.code()).collect()
    }

    fn round_trips<E: CodeEnum + PartialEq + std::fmt::Debug>() {
        for value in E::values() {
            assert_eq!(E::from_code(value.code()).unwrap(), *value);
        }
    }

    fn numeric_round_trips<E: NumericCodeEnum + PartialEq + std::fmt::Debug>() {
        for value in E::values() {
            assert_eq!(E::from_numeric_code(value.numeric_code()).unwrap(), *value);
        }
    }

    #[test]
    fn test_every_enum_round_trips() {
        round_trips::<PartyType>();
        round_trips::<EntityType>();
        round_trips::<ConstraintType>();
        round_trips::<ValueType>();
        round_trips::<MeasurementSystem>();
        round_trips::<MeasurementUnitType>();
        round_trips::<RequiredMandataries>();
        round_trips::<Catalogue>();
    }

    #[test]
    fn test_numeric_enums_round_trip() {
        numeric_round_trips::<EntityType>();
        numeric_round_trips::<MeasurementSystem>();
        numeric_round_trips::<MeasurementUnitType>();
        numeric_round_trips::<RequiredMandataries>();
    }

    #[test]
    fn test_codes_are_unique() {
        let codes = all_codes::<Catalogue>();
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn test_unknown_code_error_names_the_enum() {
        let error = ConstraintType::from_code("maybe").unwrap_err();
        assert_eq!(error.enum_name, ConstraintType::NAME);
        assert_eq!(error.code, "maybe");

        let error: PartyError = error.into();
        assert!(!error.is_business_rule());
    }

    #[test]
    fn test_enum_serializes_as_code() {
        let json = serde_json::to_string(&RequiredMandataries::AtLeastTwo).unwrap();
        assert_eq!(json, "\"at_least_two\"");
        assert!(serde_json::from_str::<RequiredMandataries>("\"most\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_unknown_party_type_codes_fail(code in "[a-z_]{1,20}") {
            prop_assume!(!all_codes::<PartyType>().contains(&code.as_str()));
            prop_assert!(PartyType::from_code(&code).is_err());
        }

        #[test]
        fn prop_numeric_codes_outside_table_fail(code in 5i32..10_000) {
            prop_assert!(EntityType::from_numeric_code(code).is_err());
            prop_assert!(RequiredMandataries::from_numeric_code(-code).is_err());
        }
    }
}

// ============================================================================
// Composite keys
// ============================================================================

mod key_tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    // Each field is drawn from two values, so generated keys collide often
    // enough for equality and transitivity to be exercised.
    type Fields = (u8, u8, u8);

    fn fields() -> impl Strategy<Value = Fields> {
        (0u8..2, 0u8..2, 0u8..2)
    }

    fn party(n: u8) -> PartyId {
        PartyId::from_uuid(uuid::Uuid::from_u128(u128::from(n) + 1))
    }

    fn tax_number_id((party_id, tax_type, country): Fields) -> TaxNumberId {
        TaxNumberId::new(party(party_id), ["income_tax", "vat"][tax_type as usize], ["ZA", "GB"][country as usize])
    }

    fn mandatary_id((mandate_id, party_id, role): Fields) -> MandataryId {
        MandataryId::new(
            MandateId::from_uuid(uuid::Uuid::from_u128(u128::from(mandate_id) + 1)),
            party(party_id),
            ["signatory", "witness"][role as usize],
        )
    }

    fn constraint_id((role_type, attribute_type, constraint_type): Fields) -> RoleTypeAttributeConstraintId {
        RoleTypeAttributeConstraintId::new(
            ["employee", "employer"][role_type as usize],
            ["employee_number", "height"][attribute_type as usize],
            [ConstraintType::Required, ConstraintType::Pattern][constraint_type as usize],
        )
    }

    fn check_key_laws<K: Eq + Hash + std::fmt::Debug>(
        key: fn(Fields) -> K,
        a: Fields,
        b: Fields,
        c: Fields,
    ) -> Result<(), TestCaseError> {
        let (ka, kb, kc) = (key(a), key(b), key(c));
        // Equal exactly when every field is equal
        prop_assert_eq!(ka == kb, a == b);
        if ka == kb {
            prop_assert_eq!(hash_of(&ka), hash_of(&kb));
        }
        if ka == kb && kb == kc {
            prop_assert_eq!(&ka, &kc);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_equal_keys_hash_equally(code in "[a-z]{1,10}", locale in "[a-z]{2}-[A-Z]{2}") {
            let a = ReferenceKey::new(code.clone(), locale.clone());
            let b = ReferenceKey::new(code, locale);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }

        #[test]
        fn prop_tax_number_id_laws(a in fields(), b in fields(), c in fields()) {
            check_key_laws(tax_number_id, a, b, c)?;
        }

        #[test]
        fn prop_mandatary_id_laws(a in fields(), b in fields(), c in fields()) {
            check_key_laws(mandatary_id, a, b, c)?;
        }

        #[test]
        fn prop_constraint_id_laws(a in fields(), b in fields(), c in fields()) {
            check_key_laws(constraint_id, a, b, c)?;
        }

        #[test]
        fn prop_keys_differing_in_one_field_are_unequal(role in "[a-z]{1,10}", other in "[a-z]{1,10}") {
            prop_assume!(role != other);
            let party_id = PartyId::new();
            prop_assert_ne!(
                ContactMechanismId::new(party_id, role),
                ContactMechanismId::new(party_id, other)
            );
        }
    }

    #[test]
    fn test_optional_key_component_participates_in_equality() {
        let party_id = PartyId::new();
        let issued = NaiveDate::from_ymd_opt(2020, 1, 1);
        let with_date = IdentityDocumentId::new(party_id, "passport", "ZA", issued);
        let without_date = IdentityDocumentId::new(party_id, "passport", "ZA", None);
        assert_ne!(with_date, without_date);
        assert_eq!(with_date, IdentityDocumentId::new(party_id, "passport", "ZA", issued));
    }

    #[test]
    fn test_aggregate_replaces_by_natural_key() {
        let mut person = Person::named(TenantId::new(), "Thabo", "Nkosi");
        let id = person.id;
        let issued = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();

        person.add_identity_document(IdentityDocument::new(id, "passport", "ZA", "A1").issued_on(issued));
        person.add_identity_document(IdentityDocument::new(id, "passport", "ZA", "A2").issued_on(issued));
        person.add_identity_document(IdentityDocument::new(id, "passport", "GB", "B1").issued_on(issued));

        assert_eq!(person.identity_documents.len(), 2);
        let key = IdentityDocumentId::new(id, "passport", "ZA", Some(issued));
        assert_eq!(person.identity_documents.get(&key).unwrap().number, "A2");
    }
}

// ============================================================================
// Reference data
// ============================================================================

mod reference_tests {
    use super::*;

    fn gender(code: &str, locale: &str, sort_index: Option<i32>, name: &str) -> ReferenceRecord {
        ReferenceRecord::new(Catalogue::Gender, code, locale, sort_index, name, name)
    }

    async fn port() -> MockReferenceDataPort {
        MockReferenceDataPort::with_records(vec![
            gender("male", "en-US", Some(1), "Male"),
            gender("female", "en-US", Some(2), "Female"),
            gender("unknown", "en-US", None, "Unknown"),
            gender("male", "en-GB", Some(1), "Male"),
            gender("female", "en-GB", Some(1), "Female"),
            ReferenceRecord::new(Catalogue::Title, "mr", "en-US", Some(1), "Mr", "Mister"),
        ])
        .await
    }

    fn codes(rows: &[Gender]) -> Vec<(&str, &str)> {
        rows.iter().map(|g| (g.locale_id.as_str(), g.code.as_str())).collect()
    }

    #[tokio::test]
    async fn test_find_all_orders_by_locale_then_sort_index_then_name() {
        let port = port().await;
        let rows: Vec<Gender> = port.find_all(SortIndexOrder::Descending).await.unwrap();

        assert_eq!(
            codes(&rows),
            vec![
                ("en-GB", "female"),
                ("en-GB", "male"),
                ("en-US", "female"),
                ("en-US", "male"),
                ("en-US", "unknown"),
            ]
        );
    }

    #[tokio::test]
    async fn test_ascending_sort_index() {
        let port = port().await;
        let rows: Vec<Gender> = port.find_by_locale("en-US", SortIndexOrder::Ascending).await.unwrap();
        assert_eq!(
            codes(&rows),
            vec![("en-US", "male"), ("en-US", "female"), ("en-US", "unknown")]
        );
    }

    #[tokio::test]
    async fn test_locale_match_ignores_case() {
        let port = port().await;
        let upper: Vec<Gender> = port.find_by_locale("EN-GB", SortIndexOrder::default()).await.unwrap();
        let lower: Vec<Gender> = port.find_by_locale("en-gb", SortIndexOrder::default()).await.unwrap();
        assert_eq!(upper.len(), 2);
        assert_eq!(codes(&upper), codes(&lower));
    }

    #[tokio::test]
    async fn test_unknown_locale_is_empty() {
        let port = port().await;
        let rows: Vec<Gender> = port.find_by_locale("xx-XX", SortIndexOrder::default()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_catalogues_are_separate() {
        let port = port().await;
        let titles: Vec<Title> = port.find_all(SortIndexOrder::default()).await.unwrap();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].description, "Mister");

        let found: Option<Gender> = port.find_by_code("mr", "en-US").await.unwrap();
        assert!(found.is_none());
    }
}

// ============================================================================
// Repositories (in-memory adapters)
// ============================================================================

mod repository_tests {
    use super::*;

    #[tokio::test]
    async fn test_organization_create_exists_find_delete() {
        let store = MockPartyStore::new();
        let tenant_id = TenantId::new();
        let organization = Organization::new(tenant_id, "Acme Holdings");
        let id = organization.id;

        OrganizationPort::save(&store, &organization).await.unwrap();
        assert!(OrganizationPort::exists_by_tenant_and_id(&store, tenant_id, id).await.unwrap());
        let found = OrganizationPort::find_by_tenant_and_id(&store, tenant_id, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, organization);

        assert!(OrganizationPort::delete_by_tenant_and_id(&store, tenant_id, id).await.unwrap());
        assert!(!OrganizationPort::exists_by_tenant_and_id(&store, tenant_id, id).await.unwrap());
        assert!(!OrganizationPort::delete_by_tenant_and_id(&store, tenant_id, id).await.unwrap());
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let store = MockPartyStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let person = Person::new(tenant_a, "Jane Doe");
        PersonPort::save(&store, &person).await.unwrap();

        assert!(!PersonPort::exists_by_tenant_and_id(&store, tenant_b, person.id).await.unwrap());
        assert!(PersonPort::find_by_tenant_and_id(&store, tenant_b, person.id).await.unwrap().is_none());
        assert!(!PersonPort::delete_by_tenant_and_id(&store, tenant_b, person.id).await.unwrap());
        assert_eq!(PartyPort::find_page_by_tenant(&store, tenant_b, PageRequest::first(10)).await.unwrap().total, 0);

        // Another tenant cannot claim the id either
        let intruder = Person::with_id(person.id, tenant_b, "Mallory");
        let error = PersonPort::save(&store, &intruder).await.unwrap_err();
        assert!(error.is_conflict());
    }

    #[tokio::test]
    async fn test_name_filter_ignores_case_and_pages() {
        let store = MockPartyStore::new();
        let tenant_id = TenantId::new();
        for name in ["Acme Holdings", "ACME Insurance", "Globex", "Initech", "acme labs"] {
            OrganizationPort::save(&store, &Organization::new(tenant_id, name)).await.unwrap();
        }

        let page = OrganizationPort::find_page_by_tenant_and_name_filter(
            &store,
            tenant_id,
            "acme",
            PageRequest::new(0, 2),
        )
        .await
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "ACME Insurance");

        let descending = PageRequest::first(10).with_sort_direction(SortDirection::Descending);
        let page = OrganizationPort::find_page_by_tenant(&store, tenant_id, descending).await.unwrap();
        assert_eq!(page.items[0].name, "acme labs");
    }

    #[tokio::test]
    async fn test_association_found_from_either_party() {
        let store = MockPartyStore::new();
        let tenant_id = TenantId::new();
        let employer = Organization::new(tenant_id, "Acme");
        let employee = Person::new(tenant_id, "Jane Doe");
        let bystander = Person::new(tenant_id, "John Roe");
        OrganizationPort::save(&store, &employer).await.unwrap();
        PersonPort::save(&store, &employee).await.unwrap();
        PersonPort::save(&store, &bystander).await.unwrap();

        let association = Association::new(tenant_id, "employment", employer.id, employee.id);
        AssociationPort::save(&store, &association).await.unwrap();

        for party_id in [employer.id, employee.id] {
            let page = AssociationPort::find_page_by_tenant_and_party_id(
                &store,
                tenant_id,
                party_id,
                PageRequest::first(10),
            )
            .await
            .unwrap();
            assert_eq!(page.items, vec![association.clone()]);
        }
        let page = AssociationPort::find_page_by_tenant_and_party_id(
            &store,
            tenant_id,
            bystander.id,
            PageRequest::first(10),
        )
        .await
        .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_party_delete_cascades() {
        let store = MockPartyStore::new();
        let tenant_id = TenantId::new();
        let first = Person::new(tenant_id, "Jane Doe");
        let second = Person::new(tenant_id, "John Doe");
        PersonPort::save(&store, &first).await.unwrap();
        PersonPort::save(&store, &second).await.unwrap();
        let association = Association::new(tenant_id, "spouse", first.id, second.id);
        AssociationPort::save(&store, &association).await.unwrap();

        assert!(PartyPort::delete_by_tenant_and_id(&store, tenant_id, first.id).await.unwrap());
        assert!(!AssociationPort::exists_by_tenant_and_id(&store, tenant_id, association.id)
            .await
            .unwrap());
    }
}

// ============================================================================
// Service
// ============================================================================

mod service_tests {
    use super::*;

    async fn service() -> PartyService {
        let reference = MockReferenceDataPort::with_records(vec![
            ReferenceRecord::new(Catalogue::ContactMechanismType, "email", "en-US", Some(1), "Email", "Email"),
            ReferenceRecord::new(Catalogue::ContactMechanismRole, "work", "en-US", Some(1), "Work", "Work")
                .with_parent_code("email"),
            ReferenceRecord::new(Catalogue::PhysicalAddressType, "street", "en-US", Some(1), "Street", "Street"),
            ReferenceRecord::new(Catalogue::PhysicalAddressRole, "main", "en-US", Some(1), "Main", "Main"),
            ReferenceRecord::new(Catalogue::AssociationType, "employment", "en-US", Some(1), "Employment", "Employment"),
            ReferenceRecord::new(Catalogue::MandateType, "banking", "en-US", None, "Banking", "Banking"),
            ReferenceRecord::new(Catalogue::MandataryRole, "signatory", "en-US", None, "Signatory", "Signatory"),
        ])
        .await;
        let ports = PartyPorts::in_memory(MockPartyStore::new(), reference);
        PartyService::new(ports, PartyConfig::default())
    }

    #[tokio::test]
    async fn test_create_with_sub_entities() {
        let service = service().await;
        let mut organization = Organization::new(TenantId::new(), "Acme Holdings");
        let id = organization.id;
        organization.add_contact_mechanism(ContactMechanism::new(id, "email", "work", "info@acme.example"));
        organization.add_physical_address(PhysicalAddress::street(
            id, "main", "1", "Main Road", "Cape Town", "8001", "ZA",
        ));

        let created = service.create_organization(organization).await.unwrap();
        let found = service.get_organization(created.tenant_id, id).await.unwrap();
        assert_eq!(found.contact_mechanisms.len(), 1);
        assert_eq!(found.physical_addresses.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_fails_validation() {
        let service = service().await;
        let mut organization = Organization::new(TenantId::new(), "Acme Holdings");
        let id = organization.id;
        organization.add_contact_mechanism(ContactMechanism::new(id, "fax", "work", "021 555 0100"));

        let error = service.create_organization(organization).await.unwrap_err();
        match error {
            PartyError::ValidationFailed(message) => assert!(message.contains("fax")),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_and_not_found_are_business_outcomes() {
        let service = service().await;
        let tenant_id = TenantId::new();
        let organization = service
            .create_organization(Organization::new(tenant_id, "Acme"))
            .await
            .unwrap();

        let duplicate = service.create_organization(organization.clone()).await.unwrap_err();
        assert!(duplicate.is_duplicate());
        assert!(duplicate.is_business_rule());

        let missing = service.delete_person(tenant_id, PartyId::new()).await.unwrap_err();
        assert!(missing.is_not_found());
        assert!(missing.is_business_rule());

        // Earlier work in the unit of work is still visible
        assert!(service.party_exists(tenant_id, organization.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_association_requires_existing_parties() {
        let service = service().await;
        let tenant_id = TenantId::new();
        let employer = service.create_organization(Organization::new(tenant_id, "Acme")).await.unwrap();

        let association = Association::new(tenant_id, "employment", employer.id, PartyId::new());
        let error = service.create_association(association).await.unwrap_err();
        assert!(matches!(error, PartyError::ValidationFailed(_)));

        let employee = service.create_person(Person::new(tenant_id, "Jane Doe")).await.unwrap();
        let association = Association::new(tenant_id, "employment", employer.id, employee.id);
        service.create_association(association).await.unwrap();

        let page = service
            .list_associations_for_party(tenant_id, employee.id, PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let service = service().await;
        let tenant_id = TenantId::new();
        let page = service
            .list_parties(tenant_id, PageRequest::new(0, 10_000))
            .await
            .unwrap();
        assert_eq!(page.page_size, service.config().max_page_size);
    }

    #[tokio::test]
    async fn test_mandate_listed_for_each_mandatary() {
        let service = service().await;
        let tenant_id = TenantId::new();

        let first = service.create_person(Person::new(tenant_id, "Jane Doe")).await.unwrap();
        let second = service.create_person(Person::new(tenant_id, "John Doe")).await.unwrap();
        let mut mandate = Mandate::new(tenant_id, "banking", RequiredMandataries::AtLeastTwo);
        mandate.add_mandatary(first.id, "signatory");
        mandate.add_mandatary(second.id, "signatory");
        let mandate = service.create_mandate(mandate).await.unwrap();

        for party_id in [first.id, second.id] {
            let page = service
                .list_mandates_for_party(tenant_id, party_id, PageRequest::first(10))
                .await
                .unwrap();
            assert_eq!(page.items[0].id, mandate.id);
        }
        assert!(mandate.is_authorized(&[first.id, second.id]));
        assert!(!mandate.is_authorized(&[first.id]));
    }

    /// Snapshot history whose appends can be made to fail
    #[derive(Default)]
    struct SwitchableSnapshots {
        failing: std::sync::atomic::AtomicBool,
        inner: MockPartyStore,
    }

    impl SwitchableSnapshots {
        fn fail(&self, failing: bool) {
            self.failing.store(failing, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl DomainPort for SwitchableSnapshots {}

    #[async_trait::async_trait]
    impl HealthCheckable for SwitchableSnapshots {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("switchable-snapshots", 0)
        }
    }

    #[async_trait::async_trait]
    impl SnapshotPort for SwitchableSnapshots {
        async fn append(&self, snapshot: &Snapshot) -> Result<(), PortError> {
            if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(PortError::connection("snapshot store unavailable"));
            }
            self.inner.append(snapshot).await
        }

        async fn find_page_by_tenant_and_entity(
            &self,
            tenant_id: TenantId,
            entity_type: EntityType,
            entity_id: uuid::Uuid,
            page: PageRequest,
        ) -> Result<Page<Snapshot>, PortError> {
            self.inner
                .find_page_by_tenant_and_entity(tenant_id, entity_type, entity_id, page)
                .await
        }
    }

    async fn service_with_snapshots(snapshots: Arc<SwitchableSnapshots>) -> PartyService {
        let mut ports = PartyPorts::in_memory(MockPartyStore::new(), MockReferenceDataPort::new());
        ports.snapshots = snapshots;
        PartyService::new(ports, PartyConfig::default())
    }

    #[tokio::test]
    async fn test_create_without_snapshot_is_undone() {
        let snapshots = Arc::new(SwitchableSnapshots::default());
        let service = service_with_snapshots(snapshots.clone()).await;
        let organization = Organization::new(TenantId::new(), "Acme");
        let (tenant_id, id) = (organization.tenant_id, organization.id);

        snapshots.fail(true);
        let error = service.create_organization(organization.clone()).await.unwrap_err();
        assert!(matches!(error, PartyError::Port(PortError::Connection { .. })));
        assert!(!service.party_exists(tenant_id, id).await.unwrap());

        // A retry is a fresh create, not a duplicate, and is recorded
        snapshots.fail(false);
        service.create_organization(organization).await.unwrap();
        let history = service
            .list_snapshots(tenant_id, EntityType::Organization, *id.as_uuid(), PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(history.total, 1);
    }

    #[tokio::test]
    async fn test_update_without_snapshot_restores_previous_version() {
        let snapshots = Arc::new(SwitchableSnapshots::default());
        let service = service_with_snapshots(snapshots.clone()).await;
        let tenant_id = TenantId::new();
        let person = service
            .create_person(Person::named(tenant_id, "Jane", "Doe"))
            .await
            .unwrap();

        snapshots.fail(true);
        let mut renamed = person.clone();
        renamed.preferred_name = Some("JD".to_string());
        assert!(service.update_person(renamed).await.is_err());

        let stored = service.get_person(tenant_id, person.id).await.unwrap();
        assert_eq!(stored.preferred_name, None);
        let history = service
            .list_snapshots(tenant_id, EntityType::Person, *person.id.as_uuid(), PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(history.total, 1);
    }

    #[test]
    fn test_ports_are_object_safe() {
        let ports = PartyPorts::in_memory(MockPartyStore::new(), MockReferenceDataPort::new());
        let _: Arc<dyn OrganizationPort> = ports.organizations.clone();
    }
}
