//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating party data that maintains
//! domain invariants.

use core_kernel::{PageRequest, PartyId, SortDirection, TenantId};
use domain_party::party::{Organization, Person};
use domain_party::reference::{Catalogue, ReferenceRecord};
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for tenant ids
pub fn tenant_id_strategy() -> impl Strategy<Value = TenantId> {
    any::<u128>().prop_map(|n| TenantId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for party ids
pub fn party_id_strategy() -> impl Strategy<Value = PartyId> {
    any::<u128>().prop_map(|n| PartyId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for ISO 3166 alpha-2 country codes
pub fn country_code_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{2}"
}

/// Strategy for locale ids in mixed case, such as `en-US` or `AF-za`
pub fn locale_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("en-US"), Just("en-ZA"), Just("af-ZA"), Just("zu-ZA")].prop_flat_map(|locale| {
        proptest::collection::vec(any::<bool>(), locale.len()).prop_map(move |upper| {
            locale
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                .collect::<String>()
        })
    })
}

/// Strategy for party names, including the characters a name filter must escape
pub fn party_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}( [A-Z][a-z]{1,10})?( (100%|a_b|c\\\\d))?"
}

/// Strategy for reference codes
pub fn reference_code_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{1,15}"
}

/// Strategy for catalogues that need no catalogue-specific columns
pub fn simple_catalogue_strategy() -> impl Strategy<Value = Catalogue> {
    prop_oneof![
        Just(Catalogue::Gender),
        Just(Catalogue::Title),
        Just(Catalogue::RoleType),
        Just(Catalogue::LockType),
        Just(Catalogue::Occupation),
    ]
}

/// Strategy for a reference row in the given catalogue with an optional sort index
pub fn reference_record_strategy(catalogue: Catalogue) -> impl Strategy<Value = ReferenceRecord> {
    (
        reference_code_strategy(),
        prop_oneof![Just("en-US"), Just("af-ZA")],
        proptest::option::of(0i32..20),
        "[A-Z][a-z]{2,12}",
    )
        .prop_map(move |(code, locale, sort_index, name)| {
            ReferenceRecord::new(catalogue, code, locale, sort_index, name.clone(), name)
        })
}

/// Strategy for catalogue contents: rows with distinct codes per locale
pub fn reference_records_strategy(catalogue: Catalogue) -> impl Strategy<Value = Vec<ReferenceRecord>> {
    proptest::collection::vec(reference_record_strategy(catalogue), 0..20).prop_map(|records| {
        let mut seen = std::collections::HashSet::new();
        records
            .into_iter()
            .filter(|record| seen.insert((record.code.clone(), record.locale_id.clone())))
            .collect()
    })
}

/// Strategy for page requests, including out-of-range sizes
pub fn page_request_strategy() -> impl Strategy<Value = PageRequest> {
    (0u32..10, 0u32..150, any::<bool>()).prop_map(|(page_index, page_size, ascending)| {
        let direction = if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        PageRequest::new(page_index, page_size).with_sort_direction(direction)
    })
}

/// Strategy for bare organizations in one tenant
pub fn organization_strategy(tenant_id: TenantId) -> impl Strategy<Value = Organization> {
    (party_name_strategy(), proptest::collection::vec(country_code_strategy(), 0..3)).prop_map(
        move |(name, countries)| {
            let mut organization = Organization::new(tenant_id, name);
            organization.countries_of_tax_residence = countries;
            organization
        },
    )
}

/// Strategy for named persons in one tenant
pub fn person_strategy(tenant_id: TenantId) -> impl Strategy<Value = Person> {
    ("[A-Z][a-z]{2,10}", "[A-Z][a-z]{2,12}", proptest::option::of(country_code_strategy())).prop_map(
        move |(given_name, surname, country_of_birth)| {
            let mut person = Person::named(tenant_id, given_name, surname);
            person.country_of_birth = country_of_birth;
            person
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_party::validation::PartyValidator;

    proptest! {
        #[test]
        fn generated_organizations_are_valid(organization in organization_strategy(TenantId::new())) {
            prop_assert!(PartyValidator::validate_organization(&organization).is_valid);
        }

        #[test]
        fn generated_persons_are_valid(person in person_strategy(TenantId::new())) {
            prop_assert!(PartyValidator::validate_person(&person).is_valid);
        }

        #[test]
        fn locales_differ_only_in_case(locale in locale_strategy()) {
            let lower = locale.to_ascii_lowercase();
            prop_assert!(["en-us", "en-za", "af-za", "zu-za"].contains(&lower.as_str()));
        }

        #[test]
        fn reference_records_have_unique_keys(records in reference_records_strategy(Catalogue::Gender)) {
            let keys: std::collections::HashSet<_> = records.iter().map(|r| r.key()).collect();
            prop_assert_eq!(keys.len(), records.len());
        }
    }
}
