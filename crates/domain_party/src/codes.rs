//! Closed enumerations of the party domain
//!
//! Each enumeration persists as its string code; the ones marked `numeric`
//! are also stored as a small integer. Unknown codes fail with
//! [`InvalidCodeError`](core_kernel::InvalidCodeError).

use core_kernel::code_enum;

code_enum! {
    /// The kind of party
    pub enum PartyType("party type") {
        /// A legal entity such as a company or trust
        Organization => ("organization", "Organization"),
        /// A natural person
        Person => ("person", "Person"),
    }
}

code_enum! {
    /// The kind of entity a snapshot records
    pub enum EntityType("entity type") numeric {
        Association => (1, "association", "Association"),
        Mandate => (2, "mandate", "Mandate"),
        Organization => (3, "organization", "Organization"),
        Person => (4, "person", "Person"),
    }
}

impl From<PartyType> for EntityType {
    fn from(party_type: PartyType) -> Self {
        match party_type {
            PartyType::Organization => EntityType::Organization,
            PartyType::Person => EntityType::Person,
        }
    }
}

code_enum! {
    /// A rule applied to an attribute of a party holding a given role
    pub enum ConstraintType("constraint type") {
        /// Maximum string length; the constraint value is the limit
        MaxSize => ("max_size", "Max Size"),
        /// Minimum string length; the constraint value is the limit
        MinSize => ("min_size", "Min Size"),
        /// The attribute must match the regular expression in the constraint value
        Pattern => ("pattern", "Pattern"),
        /// The attribute must be a code of the reference catalogue named in the constraint value
        Reference => ("reference", "Reference"),
        /// The attribute must be present
        Required => ("required", "Required"),
    }
}

code_enum! {
    /// The type of value an attribute holds
    pub enum ValueType("value type") {
        Boolean => ("boolean", "Boolean"),
        Date => ("date", "Date"),
        Decimal => ("decimal", "Decimal"),
        Double => ("double", "Double"),
        Integer => ("integer", "Integer"),
        String => ("string", "String"),
    }
}

code_enum! {
    /// A system of measurement
    pub enum MeasurementSystem("measurement system") numeric {
        Metric => (1, "metric", "Metric"),
        Imperial => (2, "imperial", "Imperial"),
        UsCustomary => (3, "us_customary", "US Customary"),
    }
}

code_enum! {
    /// The physical quantity a measurement unit measures
    pub enum MeasurementUnitType("measurement unit type") numeric {
        Length => (1, "length", "Length"),
        Mass => (2, "mass", "Mass"),
        Temperature => (3, "temperature", "Temperature"),
        Volume => (4, "volume", "Volume"),
    }
}

code_enum! {
    /// How many mandataries must act together under a mandate
    pub enum RequiredMandataries("required mandataries") numeric {
        All => (1, "all", "All"),
        Any => (2, "any", "Any"),
        AtLeastTwo => (3, "at_least_two", "At Least Two"),
        AtLeastThree => (4, "at_least_three", "At Least Three"),
    }
}

impl RequiredMandataries {
    /// Whether `acting` distinct mandataries out of `total` satisfy this rule
    pub fn is_satisfied(&self, acting: usize, total: usize) -> bool {
        if total == 0 || acting == 0 {
            return false;
        }
        match self {
            RequiredMandataries::All => acting >= total,
            RequiredMandataries::Any => true,
            RequiredMandataries::AtLeastTwo => acting >= 2.min(total),
            RequiredMandataries::AtLeastThree => acting >= 3.min(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{CodeEnum, NumericCodeEnum};

    #[test]
    fn test_party_type_codes() {
        assert_eq!(PartyType::Organization.code(), "organization");
        assert_eq!(PartyType::from_code("person").unwrap(), PartyType::Person);
        assert!(PartyType::from_code("PERSON").is_err());
    }

    #[test]
    fn test_entity_type_numeric_codes() {
        assert_eq!(EntityType::Person.numeric_code(), 4);
        assert_eq!(EntityType::from_numeric_code(2).unwrap(), EntityType::Mandate);
        assert!(EntityType::from_numeric_code(5).is_err());
    }

    #[test]
    fn test_entity_type_from_party_type() {
        assert_eq!(EntityType::from(PartyType::Organization), EntityType::Organization);
        assert_eq!(EntityType::from(PartyType::Person), EntityType::Person);
    }

    #[test]
    fn test_required_mandataries() {
        assert!(RequiredMandataries::All.is_satisfied(3, 3));
        assert!(!RequiredMandataries::All.is_satisfied(2, 3));
        assert!(RequiredMandataries::Any.is_satisfied(1, 3));
        assert!(RequiredMandataries::AtLeastTwo.is_satisfied(2, 5));
        assert!(!RequiredMandataries::AtLeastTwo.is_satisfied(1, 5));
        // A mandate with a single mandatary cannot demand two signatures
        assert!(RequiredMandataries::AtLeastTwo.is_satisfied(1, 1));
        assert!(!RequiredMandataries::AtLeastThree.is_satisfied(2, 4));
        assert!(!RequiredMandataries::Any.is_satisfied(0, 4));
    }
}
