//! Party validation rules
//!
//! Validation happens in two stages:
//!
//! 1. **Structural** (synchronous): field lengths and formats declared with
//!    `validator` derives, country codes, address structure by address type,
//!    date ordering, and aggregate-level rules such as "a mandate has at
//!    least one mandatary".
//! 2. **Reference** (asynchronous, needs a [`ReferenceDataPort`]): every code
//!    a party uses must exist in its catalogue for the validation locale, a
//!    marriage type must belong to the person's marital status, attribute
//!    values must have their attribute type's value type, and the
//!    role-type attribute constraints of every role the party holds must
//!    be satisfied.
//!
//! Both stages report into a [`ValidationResult`] so all problems are
//! returned together.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use regex::Regex;
use validator::Validate;

use core_kernel::{CodeEnum, PortError};

use crate::association::Association;
use crate::codes::ConstraintType;
use crate::error::PartyError;
use crate::mandate::Mandate;
use crate::party::{Organization, PartyAggregate, Person};
use crate::ports::{ReferenceDataPort, ReferenceDataPortExt};
use crate::reference::{AttributeType, Catalogue, MarriageType, SortIndexOrder};

/// Result of party validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the entity is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates a failed validation result with errors
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Converts a failed result into `PartyError::ValidationFailed`
    pub fn into_result(self) -> Result<(), PartyError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(PartyError::validation_failed(self.errors))
        }
    }

    fn add_derived(&mut self, context: &str, entity: &impl Validate) {
        if let Err(errors) = entity.validate() {
            self.add_error(format!("{}: {}", context, errors));
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}

/// Validator for party aggregates
///
/// # Examples
///
/// ```rust
/// use core_kernel::TenantId;
/// use domain_party::party::Organization;
/// use domain_party::validation::PartyValidator;
///
/// let organization = Organization::new(TenantId::new(), "");
/// let result = PartyValidator::validate_organization(&organization);
/// assert!(!result.is_valid);
/// ```
pub struct PartyValidator;

impl PartyValidator {
    pub fn validate_organization(organization: &Organization) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.add_derived("organization", organization);
        Self::validate_common(organization, &mut result);
        result
    }

    pub fn validate_person(person: &Person) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.add_derived("person", person);
        Self::validate_common(person, &mut result);

        let today = Utc::now().date_naive();
        if let Some(date_of_birth) = person.date_of_birth {
            if date_of_birth > today {
                result.add_error("Date of birth cannot be in the future");
            }
            if let Some(date_of_death) = person.date_of_death {
                if date_of_death < date_of_birth {
                    result.add_error("Date of death cannot precede date of birth");
                }
            }
        }
        if person.marriage_type.is_some() && person.marital_status.is_none() {
            result.add_error("A marriage type requires a marital status");
        }
        for country in &person.countries_of_citizenship {
            if !is_country_code(country) {
                result.add_error(format!("Invalid country of citizenship: {}", country));
            }
        }
        for (label, country) in [
            ("country of birth", &person.country_of_birth),
            ("country of residence", &person.country_of_residence),
        ] {
            if let Some(country) = country {
                if !is_country_code(country) {
                    result.add_error(format!("Invalid {}: {}", label, country));
                }
            }
        }

        for source in &person.sources_of_funds {
            result.add_derived("source of funds", source);
        }
        let total: i64 = person
            .sources_of_funds
            .iter()
            .filter_map(|s| s.percentage)
            .map(i64::from)
            .sum();
        if total > 100 {
            result.add_error(format!("Sources of funds total {}%, more than 100%", total));
        }

        result
    }

    pub fn validate_mandate(mandate: &Mandate) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.add_derived("mandate", mandate);

        if mandate.mandataries.is_empty() {
            result.add_error("A mandate requires at least one mandatary");
        }
        for mandatary in &mandate.mandataries {
            if mandatary.mandate_id != mandate.id {
                result.add_error(format!(
                    "Mandatary {} belongs to mandate {}",
                    mandatary.party_id, mandatary.mandate_id
                ));
            }
        }
        if let (Some(from), Some(to)) = (mandate.effective_from, mandate.effective_to) {
            if to < from {
                result.add_error("Mandate effective_to precedes effective_from");
            }
        }
        result
    }

    pub fn validate_association(association: &Association) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.add_derived("association", association);

        if association.first_party_id == association.second_party_id {
            result.add_error("An association requires two distinct parties");
        }
        if let (Some(from), Some(to)) = (association.effective_from, association.effective_to) {
            if to < from {
                result.add_error("Association effective_to precedes effective_from");
            }
        }
        result
    }

    /// Rules shared by organizations and persons
    fn validate_common<A: PartyAggregate>(party: &A, result: &mut ValidationResult) {
        if party.name().trim().is_empty() {
            result.add_error("Party name cannot be blank");
        }
        for country in party.countries_of_tax_residence() {
            if !is_country_code(country) {
                result.add_error(format!("Invalid country of tax residence: {}", country));
            }
        }

        for contact_mechanism in party.contact_mechanisms() {
            result.add_derived("contact mechanism", contact_mechanism);
        }
        for address in party.physical_addresses() {
            result.add_derived("physical address", address);
            for error in address.structure_errors() {
                result.add_error(error);
            }
            if !is_country_code(&address.country) {
                result.add_error(format!("Invalid address country: {}", address.country));
            }
        }
        for document in party.identity_documents() {
            result.add_derived("identity document", document);
            if !document.has_consistent_dates() {
                result.add_error(format!(
                    "Identity document {} expires before it was issued",
                    document.document_type
                ));
            }
            if document.is_expired() {
                result.add_warning(format!("Identity document {} has expired", document.document_type));
            }
        }
        for tax_number in party.tax_numbers() {
            result.add_derived("tax number", tax_number);
        }
        for reference in party.external_references() {
            result.add_derived("external reference", reference);
        }
        for preference in party.preferences() {
            result.add_derived("preference", preference);
        }
        for attribute in party.attributes() {
            result.add_derived("attribute", attribute);
        }
        for role in party.roles() {
            result.add_derived("role", role);
        }
        for lock in party.locks() {
            result.add_derived("lock", lock);
        }
        for status in party.statuses() {
            result.add_derived("status", status);
        }
    }

    /// Checks every reference code an organization uses
    pub async fn validate_organization_references<P>(
        port: &P,
        organization: &Organization,
        locale_id: &str,
    ) -> Result<ValidationResult, PortError>
    where
        P: ReferenceDataPort + ?Sized,
    {
        let mut checks = CodeChecks::default();
        checks.collect_common(organization);
        let mut result = checks.run(port, locale_id).await?;
        result.merge(Self::validate_attributes(port, organization, locale_id).await?);
        Ok(result)
    }

    /// Checks every reference code a person uses
    pub async fn validate_person_references<P>(
        port: &P,
        person: &Person,
        locale_id: &str,
    ) -> Result<ValidationResult, PortError>
    where
        P: ReferenceDataPort + ?Sized,
    {
        let mut checks = CodeChecks::default();
        checks.collect_common(person);
        checks.push_opt(Catalogue::Title, "title", &person.title);
        checks.push_opt(Catalogue::Gender, "gender", &person.gender);
        checks.push_opt(Catalogue::Race, "race", &person.race);
        checks.push_opt(Catalogue::MaritalStatus, "marital status", &person.marital_status);
        checks.push_opt(Catalogue::MarriageType, "marriage type", &person.marriage_type);
        checks.push_opt(Catalogue::Occupation, "occupation", &person.occupation);
        checks.push_opt(Catalogue::EmploymentStatus, "employment status", &person.employment_status);
        checks.push_opt(Catalogue::ResidencyStatus, "residency status", &person.residency_status);
        checks.push_opt(Catalogue::TimeToContact, "time to contact", &person.time_to_contact);
        for source in &person.sources_of_funds {
            checks.push(Catalogue::SourceOfFundsType, "source of funds type", &source.source_of_funds_type);
        }
        let mut result = checks.run(port, locale_id).await?;

        if let (Some(marital_status), Some(marriage_type)) = (&person.marital_status, &person.marriage_type) {
            let found: Option<MarriageType> = port.find_by_code(marriage_type, locale_id).await?;
            if let Some(found) = found {
                if &found.marital_status != marital_status {
                    result.add_error(format!(
                        "Marriage type {} is not valid for marital status {}",
                        marriage_type, marital_status
                    ));
                }
            }
        }

        result.merge(Self::validate_attributes(port, person, locale_id).await?);
        Ok(result)
    }

    /// Checks attribute value types and the constraints of the party's roles
    pub async fn validate_attributes<P, A>(
        port: &P,
        party: &A,
        locale_id: &str,
    ) -> Result<ValidationResult, PortError>
    where
        P: ReferenceDataPort + ?Sized,
        A: PartyAggregate + Sync,
    {
        let mut result = ValidationResult::ok();

        if !party.attributes().is_empty() {
            let attribute_types: Vec<AttributeType> =
                port.find_by_locale(locale_id, SortIndexOrder::default()).await?;
            let value_types: HashMap<_, _> = attribute_types
                .iter()
                .map(|t| (t.code.as_str(), t.value_type))
                .collect();
            for attribute in party.attributes() {
                match value_types.get(attribute.attribute_type.as_str()) {
                    None => result.add_error(format!(
                        "Unknown attribute type: {}",
                        attribute.attribute_type
                    )),
                    Some(expected) if *expected != attribute.value.value_type() => {
                        result.add_error(format!(
                            "Attribute {} must be of type {}, found {}",
                            attribute.attribute_type,
                            expected,
                            attribute.value.value_type()
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        for role in party.roles() {
            let constraints = port
                .find_role_type_attribute_type_constraints(Some(role.role_type.as_str()))
                .await?;
            for constraint in constraints {
                let attribute = party
                    .attributes()
                    .iter()
                    .find(|a| a.attribute_type == constraint.attribute_type);
                let text = attribute.map(|a| a.value.as_text());
                let label = format!("Attribute {} for role {}", constraint.attribute_type, role.role_type);

                match constraint.constraint_type {
                    ConstraintType::Required => {
                        if attribute.is_none() {
                            result.add_error(format!("{} is required", label));
                        }
                    }
                    ConstraintType::MaxSize | ConstraintType::MinSize => {
                        let Some(text) = text else { continue };
                        let Some(limit) = constraint.value.as_deref().and_then(|v| v.trim().parse::<usize>().ok())
                        else {
                            result.add_warning(format!("{} has an unusable size constraint", label));
                            continue;
                        };
                        let length = text.chars().count();
                        if constraint.constraint_type == ConstraintType::MaxSize && length > limit {
                            result.add_error(format!("{} must be at most {} characters", label, limit));
                        }
                        if constraint.constraint_type == ConstraintType::MinSize && length < limit {
                            result.add_error(format!("{} must be at least {} characters", label, limit));
                        }
                    }
                    ConstraintType::Pattern => {
                        let Some(text) = text else { continue };
                        let pattern = constraint.value.as_deref().unwrap_or_default();
                        match Regex::new(&format!("^(?:{})$", pattern)) {
                            Ok(regex) if regex.is_match(&text) => {}
                            Ok(_) => result.add_error(format!("{} does not match {}", label, pattern)),
                            Err(_) => result.add_warning(format!("{} has an invalid pattern {}", label, pattern)),
                        }
                    }
                    ConstraintType::Reference => {
                        let Some(text) = text else { continue };
                        let catalogue = constraint
                            .value
                            .as_deref()
                            .and_then(|v| Catalogue::from_code(v).ok());
                        match catalogue {
                            Some(catalogue) => {
                                if !port.code_exists(catalogue, &text, locale_id).await? {
                                    result.add_error(format!(
                                        "{} must be a {} code, found {}",
                                        label,
                                        catalogue.description(),
                                        text
                                    ));
                                }
                            }
                            None => result.add_warning(format!("{} references an unknown catalogue", label)),
                        }
                    }
                }
            }
        }

        Ok(result)
    }
}

/// Reference codes to look up, grouped by catalogue
#[derive(Default)]
struct CodeChecks {
    checks: Vec<(Catalogue, &'static str, String)>,
}

impl CodeChecks {
    fn push(&mut self, catalogue: Catalogue, label: &'static str, code: &str) {
        self.checks.push((catalogue, label, code.to_string()));
    }

    fn push_opt(&mut self, catalogue: Catalogue, label: &'static str, code: &Option<String>) {
        if let Some(code) = code {
            self.push(catalogue, label, code);
        }
    }

    fn collect_common<A: PartyAggregate>(&mut self, party: &A) {
        for contact_mechanism in party.contact_mechanisms() {
            self.push(
                Catalogue::ContactMechanismType,
                "contact mechanism type",
                &contact_mechanism.contact_mechanism_type,
            );
            self.push(Catalogue::ContactMechanismRole, "contact mechanism role", &contact_mechanism.role);
        }
        for address in party.physical_addresses() {
            self.push(Catalogue::PhysicalAddressType, "physical address type", &address.address_type);
            self.push(Catalogue::PhysicalAddressRole, "physical address role", &address.role);
        }
        for document in party.identity_documents() {
            self.push(Catalogue::IdentityDocumentType, "identity document type", &document.document_type);
        }
        for tax_number in party.tax_numbers() {
            self.push(Catalogue::TaxNumberType, "tax number type", &tax_number.tax_number_type);
        }
        for reference in party.external_references() {
            self.push(Catalogue::ExternalReferenceType, "external reference type", &reference.reference_type);
        }
        for preference in party.preferences() {
            self.push(Catalogue::PreferenceType, "preference type", &preference.preference_type);
        }
        for role in party.roles() {
            self.push(Catalogue::RoleType, "role type", &role.role_type);
        }
        for lock in party.locks() {
            self.push(Catalogue::LockType, "lock type", &lock.lock_type);
        }
        for status in party.statuses() {
            self.push(Catalogue::StatusType, "status type", &status.status_type);
        }
    }

    /// Loads each catalogue once and reports the codes it lacks
    async fn run<P>(self, port: &P, locale_id: &str) -> Result<ValidationResult, PortError>
    where
        P: ReferenceDataPort + ?Sized,
    {
        let mut result = ValidationResult::ok();
        let mut known: HashMap<Catalogue, HashSet<String>> = HashMap::new();

        for (catalogue, label, code) in self.checks {
            if !known.contains_key(&catalogue) {
                let codes = port
                    .find_records(catalogue, Some(locale_id), SortIndexOrder::default())
                    .await?
                    .into_iter()
                    .map(|record| record.code)
                    .collect();
                known.insert(catalogue, codes);
            }
            let exists = known.get(&catalogue).is_some_and(|codes| codes.contains(&code));
            if !exists {
                result.add_error(format!("Unknown {} '{}' for locale {}", label, code, locale_id));
            }
        }

        Ok(result)
    }
}
