use crate::HttpStatusCode;

/// **VALUE**: Verifies the success range is exactly 200-299.
///
/// **WHY THIS MATTERS**: The client decodes a body only for success statuses; everything
/// else becomes an API error. An off-by-one here turns 300 redirects or 199 into results.
///
/// **BUG THIS CATCHES**: Would catch inclusive/exclusive range mistakes.
#[test]
fn given_status_codes_when_checking_success_then_only_2xx_qualifies() {
    assert!(HttpStatusCode(200).is_success());
    assert!(HttpStatusCode(204).is_success());
    assert!(HttpStatusCode(299).is_success());

    assert!(!HttpStatusCode(101).is_success());
    assert!(!HttpStatusCode(199).is_success());
    assert!(!HttpStatusCode(300).is_success());
    assert!(!HttpStatusCode(404).is_success());
}

/// **VALUE**: Verifies client and server error classification.
///
/// **WHY THIS MATTERS**: Callers branch on "bad request" vs "server broke" without
/// hard-coding numeric ranges.
///
/// **BUG THIS CATCHES**: Would catch overlapping or swapped ranges.
#[test]
fn given_error_statuses_when_classified_then_client_and_server_ranges_are_disjoint() {
    assert!(HttpStatusCode(404).is_client_error());
    assert!(!HttpStatusCode(404).is_server_error());
    assert!(HttpStatusCode(503).is_server_error());
    assert!(!HttpStatusCode(503).is_client_error());
}

#[test]
fn given_status_code_when_compared_to_u16_then_matches_numeric_value() {
    let status = HttpStatusCode::from(404);
    assert_eq!(status, 404u16);
    assert_eq!(status.as_u16(), 404);
    assert_eq!(status.to_string(), "404");
}
