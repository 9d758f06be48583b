//! Constant folding (spec.md §4.3): given two `Number` tokens and an
//! operator, return the resulting real.

use crate::error::CasError;
use crate::lexer::token::TokenKind;

/// Whether `op` is constant-foldable. `Modulo` and `Sqrt` are tokenized but
/// spec.md §4.3 explicitly allows leaving them unfolded ("implementations
/// may treat them as unsupported for folding").
pub fn is_foldable(op: TokenKind) -> bool {
    matches!(op, TokenKind::Plus | TokenKind::Minus | TokenKind::Multiply | TokenKind::Divide | TokenKind::Power)
}

pub fn fold_binary(op: TokenKind, left: f64, right: f64) -> Result<f64, CasError> {
    match op {
        TokenKind::Plus => Ok(left + right),
        TokenKind::Minus => Ok(left - right),
        TokenKind::Multiply => Ok(left * right),
        TokenKind::Divide => {
            if right == 0.0 {
                Err(CasError::DivByZero)
            } else {
                Ok(left / right)
            }
        }
        TokenKind::Power => Ok(left.powf(right)),
        other => Err(CasError::Unsupported(other.operator_symbol().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_the_four_arithmetic_operators() {
        assert_eq!(fold_binary(TokenKind::Plus, 2.0, 3.0).unwrap(), 5.0);
        assert_eq!(fold_binary(TokenKind::Minus, 2.0, 3.0).unwrap(), -1.0);
        assert_eq!(fold_binary(TokenKind::Multiply, 2.0, 3.0).unwrap(), 6.0);
        assert_eq!(fold_binary(TokenKind::Divide, 6.0, 3.0).unwrap(), 2.0);
        assert_eq!(fold_binary(TokenKind::Power, 2.0, 10.0).unwrap(), 1024.0);
    }

    #[test]
    fn division_by_zero_is_reported() {
        let err = fold_binary(TokenKind::Divide, 1.0, 0.0).unwrap_err();
        assert_eq!(err, CasError::DivByZero);
    }

    #[test]
    fn modulo_and_sqrt_are_not_foldable() {
        assert!(!is_foldable(TokenKind::Modulo));
        assert!(!is_foldable(TokenKind::Sqrt));
        assert!(matches!(fold_binary(TokenKind::Modulo, 5.0, 2.0), Err(CasError::Unsupported(_))));
    }
}
