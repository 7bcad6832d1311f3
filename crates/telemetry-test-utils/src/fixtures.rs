//! Identity fixtures shared by scenario tests.

pub const TEST_NODE_ID: &str = "n1";
pub const TEST_NODE_TYPE: &str = "SERVER";
pub const TEST_ENV: &str = "test";

/// Identity labels in registration order, followed by `vars`.
pub fn with_identity<'a>(vars: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut labels = vec![
        ("node_id", TEST_NODE_ID),
        ("node_type", TEST_NODE_TYPE),
        ("env", TEST_ENV),
    ];
    labels.extend_from_slice(vars);
    labels
}
