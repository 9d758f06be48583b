use algebra_cas::runner;
use algebra_cas::{CasError, Config};

#[test]
fn isolates_across_a_target_on_both_sides() {
    let config = Config::default();
    let result = runner::isolate("(x + 2) - (y - 3) = 2*(x + 5)", "x", &config).expect("isolate");
    assert_eq!(result, "x = -y - 5");
}

#[test]
fn non_equation_is_rejected() {
    let err = runner::isolate("3 + 2", "x", &Config::default()).unwrap_err();
    assert_eq!(err, CasError::NotAnEquation);
}
