//! PostgreSQL adapter integration tests
//!
//! These tests start a PostgreSQL container and are ignored by default.
//! Run them with `cargo test -p infra_db -- --ignored` where Docker is available.

use core_kernel::{AdapterHealth, HealthCheckable, PageRequest, PartyId, SortDirection, TenantId};
use domain_party::codes::{EntityType, RequiredMandataries};
use domain_party::ports::{
    AssociationPort, MandatePort, OrganizationPort, PartyPort, PersonPort, ReferenceDataPort,
    ReferenceDataPortExt,
};
use domain_party::reference::{Catalogue, Gender, ReferenceRecord, SortIndexOrder};
use domain_party::services::{PartyPorts, PartyService};
use domain_party::{Organization, Person, PartyConfig, PartyError};
use test_utils::{
    assert_conflict, assert_page, assert_page_keys, assert_reference_order, init_test_tracing,
    AssociationBuilder, MandateBuilder, OrganizationBuilder, PersonBuilder, ReferenceDataFixtures,
    TestDatabase,
};

async fn database() -> TestDatabase {
    init_test_tracing();
    let database = TestDatabase::new().await.expect("test database");
    database
        .seed_reference_data(&ReferenceDataFixtures::records(), &ReferenceDataFixtures::constraints())
        .await
        .expect("reference data");
    database
}

fn ports(database: &TestDatabase) -> PartyPorts {
    database.ports()
}

mod organizations {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_create_exists_find_delete() {
        let database = database().await;
        let ports = ports(&database);
        let organization = OrganizationBuilder::new()
            .with_name("Acme Holdings")
            .with_email("info@acme.example")
            .with_business_address()
            .with_role("employer")
            .build();
        let (tenant_id, id) = (organization.tenant_id, organization.id);

        ports.organizations.save(&organization).await.unwrap();
        assert!(ports.organizations.exists_by_tenant_and_id(tenant_id, id).await.unwrap());

        let found = ports
            .organizations
            .find_by_tenant_and_id(tenant_id, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Acme Holdings");
        assert_eq!(found.countries_of_tax_residence, vec!["ZA".to_string()]);
        assert_eq!(found.contact_mechanism("main_email").unwrap().value, "info@acme.example");
        assert_eq!(found.physical_address("business").unwrap().city, "Cape Town");
        assert!(found.has_role("employer"));

        assert!(ports.organizations.delete_by_tenant_and_id(tenant_id, id).await.unwrap());
        assert!(!ports.organizations.exists_by_tenant_and_id(tenant_id, id).await.unwrap());
        assert!(!ports.organizations.delete_by_tenant_and_id(tenant_id, id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_save_replaces_children() {
        let database = database().await;
        let ports = ports(&database);
        let mut organization = OrganizationBuilder::new().with_email("old@acme.example").build();
        ports.organizations.save(&organization).await.unwrap();

        organization.remove_contact_mechanism("main_email");
        organization.name = "Acme Renamed".to_string();
        ports.organizations.save(&organization).await.unwrap();

        let found = ports
            .organizations
            .find_by_tenant_and_id(organization.tenant_id, organization.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Acme Renamed");
        assert!(found.contact_mechanisms.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_name_filter_ignores_case_escapes_wildcards_and_pages() {
        let database = database().await;
        let ports = ports(&database);
        let tenant_id = TenantId::new();
        for name in ["Acme Holdings", "ACME Insurance", "Globex", "acme labs", "100% Acme", "Acme_1"] {
            ports
                .organizations
                .save(&Organization::new(tenant_id, name))
                .await
                .unwrap();
        }

        let page = ports
            .organizations
            .find_page_by_tenant_and_name_filter(tenant_id, "acme", PageRequest::new(0, 2))
            .await
            .unwrap();
        assert_page(&page, 2, 5);
        assert_page_keys(&page, |o| o.name.clone(), &["100% Acme".to_string(), "ACME Insurance".to_string()]);

        let page = ports
            .organizations
            .find_page_by_tenant_and_name_filter(tenant_id, "%", PageRequest::first(10))
            .await
            .unwrap();
        assert_page_keys(&page, |o| o.name.clone(), &["100% Acme".to_string()]);

        let page = ports
            .organizations
            .find_page_by_tenant_and_name_filter(tenant_id, "_", PageRequest::first(10))
            .await
            .unwrap();
        assert_page_keys(&page, |o| o.name.clone(), &["Acme_1".to_string()]);

        let descending = PageRequest::first(10).with_sort_direction(SortDirection::Descending);
        let page = ports.organizations.find_page_by_tenant(tenant_id, descending).await.unwrap();
        assert_eq!(page.items[0].name, "acme labs");
        assert_eq!(page.total, 6);
    }
}

mod persons {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_person_round_trip() {
        let database = database().await;
        let ports = ports(&database);
        let person = PersonBuilder::new()
            .with_names("Lerato", "Mokoena")
            .with_gender("female")
            .married("in_community_of_property")
            .with_email(Some("lerato@example.com".to_string()))
            .with_passport("A1234567")
            .with_tax_number("0123456789")
            .employee("004512")
            .build();

        ports.persons.save(&person).await.unwrap();
        let found = ports
            .persons
            .find_by_tenant_and_id(person.tenant_id, person.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.name, "Lerato Mokoena");
        assert_eq!(found.given_name.as_deref(), Some("Lerato"));
        assert_eq!(found.date_of_birth, person.date_of_birth);
        assert_eq!(found.marriage_type.as_deref(), Some("in_community_of_property"));
        assert_eq!(found.identity_documents.len(), 1);
        assert_eq!(found.tax_numbers.len(), 1);
        assert_eq!(found.attribute("employee_number"), person.attribute("employee_number"));
        assert!(found.has_role("employee"));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_tenant_isolation_and_conflicting_ids() {
        let database = database().await;
        let ports = ports(&database);
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let person = PersonBuilder::new().with_tenant(tenant_a).build();
        ports.persons.save(&person).await.unwrap();

        assert!(!ports.persons.exists_by_tenant_and_id(tenant_b, person.id).await.unwrap());
        assert!(ports.persons.find_by_tenant_and_id(tenant_b, person.id).await.unwrap().is_none());
        assert!(!ports.persons.delete_by_tenant_and_id(tenant_b, person.id).await.unwrap());
        assert_eq!(ports.parties.find_page_by_tenant(tenant_b, PageRequest::first(10)).await.unwrap().total, 0);

        // Neither another tenant nor the other party type can claim the id
        assert_conflict(ports.persons.save(&Person::with_id(person.id, tenant_b, "Mallory")).await);
        assert_conflict(
            ports
                .organizations
                .save(&Organization::with_id(person.id, tenant_a, "Mallory Ltd"))
                .await,
        );
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_concurrent_saves_of_one_id_never_cross_tenants() {
        let database = database().await;
        let ports = ports(&database);

        for _ in 0..20 {
            let id = PartyId::new_v7();
            let first = OrganizationBuilder::new()
                .with_id(id)
                .with_tenant(TenantId::new())
                .with_name("Tenant A Org")
                .with_email("info@tenant-a.example")
                .build();
            let second = OrganizationBuilder::new()
                .with_id(id)
                .with_tenant(TenantId::new())
                .with_name("Tenant B Org")
                .build();

            let (a, b) = tokio::join!(ports.organizations.save(&first), ports.organizations.save(&second));
            assert_ne!(a.is_ok(), b.is_ok(), "exactly one tenant may own {id}");
            let (winner, loser, rejected) = if a.is_ok() {
                (&first, &second, b)
            } else {
                (&second, &first, a)
            };
            assert_conflict(rejected);

            let stored = ports
                .organizations
                .find_by_tenant_and_id(winner.tenant_id, id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.name, winner.name);
            assert_eq!(stored.contact_mechanisms.len(), winner.contact_mechanisms.len());
            assert!(ports
                .organizations
                .find_by_tenant_and_id(loser.tenant_id, id)
                .await
                .unwrap()
                .is_none());
        }
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_parties_list_both_types() {
        let database = database().await;
        let ports = ports(&database);
        let tenant_id = TenantId::new();
        ports
            .organizations
            .save(&OrganizationBuilder::new().with_tenant(tenant_id).with_name("Zeta Corp").build())
            .await
            .unwrap();
        ports
            .persons
            .save(&PersonBuilder::new().with_tenant(tenant_id).with_names("Amy", "Able").build())
            .await
            .unwrap();

        let page = ports.parties.find_page_by_tenant(tenant_id, PageRequest::first(10)).await.unwrap();
        assert_page_keys(&page, |p| p.name.clone(), &["Amy Able".to_string(), "Zeta Corp".to_string()]);
    }
}

mod relationships {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_association_found_from_either_party() {
        let database = database().await;
        let ports = ports(&database);
        let employer = OrganizationBuilder::new().build();
        let employee = PersonBuilder::new().build();
        let bystander = PersonBuilder::new().build();
        let tenant_id = employer.tenant_id;
        ports.organizations.save(&employer).await.unwrap();
        ports.persons.save(&employee).await.unwrap();
        ports.persons.save(&bystander).await.unwrap();

        let association = AssociationBuilder::between(employee.id, employer.id).build();
        ports.associations.save(&association).await.unwrap();

        for party_id in [employer.id, employee.id] {
            let page = ports
                .associations
                .find_page_by_tenant_and_party_id(tenant_id, party_id, PageRequest::first(10))
                .await
                .unwrap();
            assert_page_keys(&page, |a| a.id, &[association.id]);
        }
        let page = ports
            .associations
            .find_page_by_tenant_and_party_id(tenant_id, bystander.id, PageRequest::first(10))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_mandates_by_mandatary() {
        let database = database().await;
        let ports = ports(&database);
        let first = PersonBuilder::new().build();
        let second = PersonBuilder::new().build();
        ports.persons.save(&first).await.unwrap();
        ports.persons.save(&second).await.unwrap();

        let mandate = MandateBuilder::new()
            .with_required_mandataries(RequiredMandataries::All)
            .with_signatory(first.id)
            .with_signatory(second.id)
            .build();
        ports.mandates.save(&mandate).await.unwrap();
        let solo = MandateBuilder::new().with_signatory(first.id).build();
        ports.mandates.save(&solo).await.unwrap();

        let page = ports
            .mandates
            .find_page_by_tenant_and_party_id(mandate.tenant_id, second.id, PageRequest::first(10))
            .await
            .unwrap();
        assert_page(&page, 1, 1);
        assert_eq!(page.items[0].required_mandataries, RequiredMandataries::All);
        assert_eq!(page.items[0].mandataries.len(), 2);

        let page = ports
            .mandates
            .find_page_by_tenant_and_party_id(mandate.tenant_id, first.id, PageRequest::first(10))
            .await
            .unwrap();
        assert_page_keys(&page, |m| m.id, &[mandate.id, solo.id]);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_mandate_id_of_another_tenant_is_rejected() {
        let database = database().await;
        let ports = ports(&database);
        let signatory = PersonBuilder::new().build();
        ports.persons.save(&signatory).await.unwrap();
        let mandate = MandateBuilder::new().with_signatory(signatory.id).build();
        ports.mandates.save(&mandate).await.unwrap();

        let mut foreign = MandateBuilder::new().with_tenant(TenantId::new()).build();
        foreign.id = mandate.id;
        assert_conflict(ports.mandates.save(&foreign).await);

        let stored = ports
            .mandates
            .find_by_tenant_and_id(mandate.tenant_id, mandate.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.mandataries.len(), 1);
        assert_eq!(stored.tenant_id, mandate.tenant_id);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_party_delete_cascades() {
        let database = database().await;
        let ports = ports(&database);
        let first = PersonBuilder::new().build();
        let second = PersonBuilder::new().build();
        let tenant_id = first.tenant_id;
        ports.persons.save(&first).await.unwrap();
        ports.persons.save(&second).await.unwrap();
        let association = AssociationBuilder::between(first.id, second.id).build();
        ports.associations.save(&association).await.unwrap();
        let mandate = MandateBuilder::new().with_signatory(first.id).with_signatory(second.id).build();
        ports.mandates.save(&mandate).await.unwrap();

        assert!(ports.parties.delete_by_tenant_and_id(tenant_id, first.id).await.unwrap());

        assert!(!ports.associations.exists_by_tenant_and_id(tenant_id, association.id).await.unwrap());
        let mandate = ports.mandates.find_by_tenant_and_id(tenant_id, mandate.id).await.unwrap().unwrap();
        assert!(!mandate.has_mandatary(first.id));
        assert!(mandate.has_mandatary(second.id));
    }
}

mod reference_data {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_ordering_and_locale_matching() {
        let database = database().await;
        let ports = ports(&database);
        let port = &*ports.reference_data;

        for order in [SortIndexOrder::Ascending, SortIndexOrder::Descending] {
            let genders: Vec<Gender> = port.find_all(order).await.unwrap();
            assert_eq!(genders.len(), 4);
            assert_reference_order(&genders, order);
        }

        let translated: Vec<Gender> = port.find_by_locale("AF-za", SortIndexOrder::Ascending).await.unwrap();
        assert_eq!(translated.len(), 2);
        assert_eq!(translated[0].name, "Vroulik");

        let unknown: Vec<Gender> = port.find_by_locale("xx-XX", SortIndexOrder::Ascending).await.unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_missing_sort_index_sorts_last() {
        let database = database().await;
        database
            .seed_reference_data(
                &[ReferenceRecord::new(Catalogue::Gender, "other", "en-US", None, "Other", "Other")],
                &[],
            )
            .await
            .unwrap();
        let ports = ports(&database);

        for order in [SortIndexOrder::Ascending, SortIndexOrder::Descending] {
            let genders: Vec<Gender> = ports
                .reference_data
                .find_by_locale("en-US", order)
                .await
                .unwrap();
            assert_eq!(genders.last().map(|g| g.code.as_str()), Some("other"));
        }
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_constraints_by_role_type() {
        let database = database().await;
        let ports = ports(&database);

        let constraints = ports
            .reference_data
            .find_role_type_attribute_type_constraints(Some("employee"))
            .await
            .unwrap();
        assert_eq!(constraints.len(), 2);
        let none = ports
            .reference_data
            .find_role_type_attribute_type_constraints(Some("employer"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}

mod service {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_service_records_snapshots() {
        let database = database().await;
        let service = PartyService::new(ports(&database), PartyConfig::default());
        let mut person = service
            .create_person(PersonBuilder::new().employee("004512").build())
            .await
            .unwrap();
        person.preferred_name = Some("Lee".to_string());
        service.update_person(person.clone()).await.unwrap();

        let history = service
            .list_snapshots(person.tenant_id, EntityType::Person, *person.id.as_uuid(), PageRequest::first(10))
            .await
            .unwrap();
        assert_page(&history, 2, 2);
        assert!(history.items[0].timestamp <= history.items[1].timestamp);
        assert_eq!(history.items[1].data["preferred_name"], "Lee");
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_role_constraints_are_enforced() {
        let database = database().await;
        let service = PartyService::new(ports(&database), PartyConfig::default());

        let result = service.create_person(PersonBuilder::new().employee("12").build()).await;
        assert!(matches!(result, Err(PartyError::ValidationFailed(ref message)) if message.contains("employee_number")));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_health_checks() {
        let database = database().await;
        let ports = ports(&database);

        assert!(matches!(ports.organizations.health_check().await.status, AdapterHealth::Healthy));
        assert!(matches!(ports.reference_data.health_check().await.status, AdapterHealth::Healthy));
    }
}
