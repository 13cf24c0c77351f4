use hrep_api::types::{BillHistory, CongressHouse, Significance};

#[test]
fn serialize_bill_history_uses_camel_case_keys() {
    let bill = BillHistory {
        bill_num: "HB00123".to_string(),
        title: "AN ACT".to_string(),
        short_title: None,
        r#abstract: Some("Establishes a hospital.".to_string()),
        date_filed: "2022-07-01".to_string(),
        significance: Significance::Local,
        committee_referrals: vec!["Referred to the Committee on Health".to_string()],
    };

    let value = serde_json::to_value(&bill).unwrap();
    assert_eq!(value["billNum"], "HB00123");
    assert_eq!(value["dateFiled"], "2022-07-01");
    assert_eq!(value["abstract"], "Establishes a hospital.");
    assert_eq!(value["significance"], "LOCAL");
    assert_eq!(value["committeeReferrals"][0], "Referred to the Committee on Health");
    assert!(value.get("shortTitle").is_none());
}

#[test]
fn deserialize_bill_history_without_optional_fields() {
    let json = r#"{
        "billNum": "123",
        "title": "AN ACT...",
        "dateFiled": "2023-01-01",
        "significance": "NATIONAL",
        "committeeReferrals": ["Status A", "Status B"]
    }"#;
    let bill: BillHistory = serde_json::from_str(json).unwrap();
    assert_eq!(bill.bill_num, "123");
    assert_eq!(bill.short_title, None);
    assert_eq!(bill.r#abstract, None);
    assert_eq!(bill.significance, Significance::National);
    assert_eq!(bill.committee_referrals, vec!["Status A", "Status B"]);
}

#[test]
fn deserialize_rejects_unknown_significance() {
    let json = r#"{
        "billNum": "123",
        "title": "AN ACT...",
        "dateFiled": "2023-01-01",
        "significance": "PROVINCIAL"
    }"#;
    assert!(serde_json::from_str::<BillHistory>(json).is_err());
}

#[test]
fn significance_parses_only_known_literals() {
    assert_eq!("NATIONAL".parse::<Significance>(), Ok(Significance::National));
    assert_eq!("LOCAL".parse::<Significance>(), Ok(Significance::Local));
    let err = "national".parse::<Significance>().unwrap_err();
    assert_eq!(err.0, "national");
    assert!("PROVINCIAL".parse::<Significance>().is_err());
    assert!("".parse::<Significance>().is_err());
}

#[test]
fn congress_house_round_trips_through_str() {
    let house: CongressHouse = "HOUSE_OF_REPRESENTATIVES".parse().unwrap();
    assert_eq!(house, CongressHouse::HouseOfRepresentatives);
    assert_eq!(house.to_string(), "HOUSE_OF_REPRESENTATIVES");
    assert!("SENADO".parse::<CongressHouse>().is_err());
}
