use icm_extract::merge::sanitize_key;

#[test]
fn replaces_everything_outside_ascii_alphanumerics() {
    assert_eq!(sanitize_key("Part No."), "Part_No_");
    assert_eq!(sanitize_key("Gewicht (kg)"), "Gewicht__kg_");
    assert_eq!(sanitize_key("Größe"), "Gr__e");
    assert_eq!(sanitize_key("plain"), "plain");
}

#[test]
fn prefixes_a_leading_digit() {
    assert_eq!(sanitize_key("1st value"), "_1st_value");
    assert_eq!(sanitize_key("2024"), "_2024");
}

#[test]
fn is_idempotent() {
    for key in ["Part No.", "1st value", "_x", "", "äöü 9", "a-b-c", "9"] {
        let once = sanitize_key(key);
        assert_eq!(sanitize_key(&once), once, "key {key:?}");
    }
}
