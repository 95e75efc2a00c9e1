//! States and union territories offered for selection
//!
//! Names are spelled the way the upstream dataset spells `state_name`.

pub const STATES: &[&str] = &[
    "UTTAR PRADESH",
    "MADHYA PRADESH",
    "BIHAR",
    "ASSAM",
    "MAHARASHTRA",
    "GUJARAT",
    "RAJASTHAN",
    "TAMIL NADU",
    "CHHATTISGARH",
    "KARNATAKA",
    "TELANGANA",
    "ODISHA",
    "ANDHRA PRADESH",
    "PUNJAB",
    "JHARKHAND",
    "HARYANA",
    "ARUNACHAL PRADESH",
    "JAMMU AND KASHMIR",
    "MANIPUR",
    "UTTARAKHAND",
    "KERALA",
    "HIMACHAL PRADESH",
    "MEGHALAYA",
    "WEST BENGAL",
    "MIZORAM",
    "NAGALAND",
    "TRIPURA",
    "SIKKIM",
    "ANDAMAN AND NICOBAR",
    "LADAKH",
    "PUDUCHERRY",
    "GOA",
    "DN HAVELI AND DD",
    "LAKSHADWEEP",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_states_unique_and_uppercase() {
        let unique: HashSet<_> = STATES.iter().collect();
        assert_eq!(unique.len(), STATES.len());
        assert!(STATES.iter().all(|s| *s == s.to_uppercase()));
    }

    #[test]
    fn test_states_serialize_as_list() {
        let json = serde_json::to_value(STATES).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 34);
        assert_eq!(json[2], "BIHAR");
    }
}
