// ABOUTME: Test case payload normalization
// ABOUTME: Coerces loosely-shaped client and generator payloads into canonical test cases

use serde_json::Value;

use testdesk_core::DEFAULT_TEST_TYPE;

use crate::types::TestCase;

// Canonical field name first, known aliases after.
const CASE_ID_KEYS: &[&str] = &["caseId", "case_id"];
const FUNC_KEYS: &[&str] = &["func", "function"];
const DESCRIPTION_KEYS: &[&str] = &["description"];
const STEPS_KEYS: &[&str] = &["steps", "test_step"];
const EXPECTED_RESULT_KEYS: &[&str] = &["expectedResult", "expected_result"];
const TEST_TYPE_KEYS: &[&str] = &["testType", "test_type", "type"];

/// Normalize one raw test case. Never fails: unknown shapes become empty fields.
pub fn normalize_test_case(raw: &Value) -> TestCase {
    TestCase {
        case_id: text_field(raw, CASE_ID_KEYS),
        func: text_field(raw, FUNC_KEYS),
        description: text_field(raw, DESCRIPTION_KEYS),
        steps: text_field(raw, STEPS_KEYS),
        expected_result: text_field(raw, EXPECTED_RESULT_KEYS),
        test_type: normalize_test_type(&text_field(raw, TEST_TYPE_KEYS)),
    }
}

/// Normalize a raw test case list; anything that is not an array yields no cases.
pub fn normalize_test_cases(raw: &Value) -> Vec<TestCase> {
    match raw {
        Value::Array(items) => items.iter().map(normalize_test_case).collect(),
        _ => Vec::new(),
    }
}

/// Normalize cases returned by the generation backend.
///
/// Case ids are owned by the generator run: `TC_<millis>_<n>`, 1-based,
/// replacing whatever the backend sent.
pub fn normalize_generated_cases(raw: &[Value], generated_at_millis: i64) -> Vec<TestCase> {
    raw.iter()
        .enumerate()
        .map(|(index, item)| TestCase {
            case_id: format!("TC_{}_{}", generated_at_millis, index + 1),
            ..normalize_test_case(item)
        })
        .collect()
}

/// Trim and lower-case a test type tag, defaulting empty tags to `functional`.
pub fn normalize_test_type(raw: &str) -> String {
    let folded = raw.trim().to_lowercase();
    if folded.is_empty() {
        DEFAULT_TEST_TYPE.to_string()
    } else {
        folded
    }
}

fn text_field(raw: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| raw.get(key).and_then(scalar_text))
        .unwrap_or_default()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
