use std::collections::HashMap;

use crate::config::LanguageConfig;
use crate::scanner::token::TokenType;

/// Build the reverse lookup the scanner uses: localized spelling -> token kind.
///
/// The keyword set is closed, so this is a straight field-by-field walk over
/// the configuration rather than a data-driven table.
pub fn keyword_map(config: &LanguageConfig) -> HashMap<String, TokenType> {
    let k = &config.keywords;
    HashMap::from([
        (k.var.clone(), TokenType::Var),
        (k.r#const.clone(), TokenType::Const),
        (k.function.clone(), TokenType::Function),
        (k.r#return.clone(), TokenType::Return),
        (k.r#if.clone(), TokenType::If),
        (k.r#else.clone(), TokenType::Else),
        (k.r#while.clone(), TokenType::While),
        (k.r#for.clone(), TokenType::For),
        (k.and.clone(), TokenType::And),
        (k.or.clone(), TokenType::Or),
        (k.print.clone(), TokenType::Print),
        (k.r#true.clone(), TokenType::True),
        (k.r#false.clone(), TokenType::False),
        (k.null.clone(), TokenType::Null),
    ])
}
