//! Property tests for the lexer

use proptest::prelude::*;
use rill_syntax::{Lexer, TokenType};

proptest! {
    #[test]
    fn identifiers_lex_as_single_tokens(name in "[a-z_][a-z0-9_]{0,20}") {
        let tokens = Lexer::new(&name).tokenize().unwrap();
        prop_assert_eq!(tokens.len(), 2);
        match &tokens[0].kind {
            TokenType::Identifier(text) => prop_assert_eq!(text, &name),
            // a handful of inputs are keywords, which is fine
            other => prop_assert!(TokenType::keyword(&name).as_ref() == Some(other)),
        }
    }

    #[test]
    fn decimal_literals_keep_their_digits(value in 0u64..=u64::MAX) {
        let text = value.to_string();
        let tokens = Lexer::new(&text).tokenize().unwrap();
        prop_assert_eq!(
            &tokens[0].kind,
            &TokenType::IntegerLiteral { text: text.clone(), radix: 10 }
        );
    }

    #[test]
    fn whitespace_never_changes_the_token_stream(padding in "[ \t\n]{1,8}") {
        let source = format!("{}var{}x", padding, padding);
        let tokens = Lexer::new(&source).tokenize().unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        prop_assert_eq!(
            kinds,
            vec![
                TokenType::KeywordVar,
                TokenType::Identifier("x".to_string()),
                TokenType::EndOfFile,
            ]
        );
    }
}
