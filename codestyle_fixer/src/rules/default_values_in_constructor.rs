//! Property defaults belong in the constructor
//!
//! `private $items = [];` becomes `private $items;` plus
//! `$this->items = [];` at the end of `__construct`. A constructor is
//! created after the last property when the class has none, calling
//! `parent::__construct()` first if the class extends another. Static
//! properties and `null` defaults are left alone, as are traits.

use super::class_body::{find_classes, ClassBody, Property};
use super::Rule;
use crate::chain::{detect_multiline_span, Chain, ChainError, NodeId};
use crate::item::CompositeItem;
use crate::{log_debug, log_warning};
use crate::tokens::{Token, TokenKind};

const DEFAULT_INDENT_UNIT: &str = "    ";

pub struct DefaultValuesInConstructor;

impl Rule for DefaultValuesInConstructor {
    fn name(&self) -> &'static str {
        "default_values_in_constructor"
    }

    fn apply(&self, chain: &mut Chain) -> Result<(), ChainError> {
        for class in find_classes(chain)? {
            fix_class(chain, &class)?;
        }
        Ok(())
    }
}

fn fix_class(chain: &mut Chain, class: &ClassBody) -> Result<(), ChainError> {
    let movable: Vec<&Property> = class
        .properties()
        .filter(|property| {
            !property.is_static && property.default.as_ref().is_some_and(|value| !value.is_null)
        })
        .collect();
    let Some(first_movable) = movable.first() else {
        return Ok(());
    };

    let constructor = class.constructor();
    if constructor.is_some_and(|method| method.body.is_none()) {
        log_warning!("Constructor has no body, property defaults left in place",
            "class_node" => class.keyword,
            "properties" => movable.len()
        );
        return Ok(());
    }

    let class_indent = chain.line_indent(class.body.open())?;
    let member_indent = chain.line_indent(first_movable.start)?;
    let unit = indent_unit(&member_indent, &class_indent);

    let existing_body = constructor.and_then(|method| method.body.as_ref().map(|body| (method.start, body)));
    let body_indent = match existing_body {
        Some((start, body)) => constructor_body_indent(chain, body, start, &unit)?,
        None => format!("{}{}", member_indent, unit),
    };

    let mut statements = Vec::with_capacity(movable.len());
    for property in &movable {
        if let Some(statement) = assignment_for(chain, property, &body_indent)? {
            statements.push(statement);
        }
    }

    for property in &movable {
        let first = chain.next(property.variable)?;
        let last = chain.previous(property.terminator)?;
        chain.remove_range(first, last)?;

        log_debug!("Moving property default into constructor",
            "property" => property.name,
            "class_node" => class.keyword
        );
    }

    match existing_body {
        Some((start, body)) => {
            let constructor_indent = chain.line_indent(start)?;
            append_to_body(chain, body, &constructor_indent, &body_indent, statements)
        }
        None => insert_constructor(chain, class, &member_indent, &body_indent, statements),
    }
}

/// `$this->name = <value>;` with the value re-indented to `body_indent`
fn assignment_for(
    chain: &Chain,
    property: &Property,
    body_indent: &str,
) -> Result<Option<Vec<Token>>, ChainError> {
    let Some(default) = property.default.as_ref() else {
        return Ok(None);
    };
    let declaration_indent = chain.line_indent(property.start)?;

    let mut tokens = vec![
        Token::classify(TokenKind::Variable, "$this"),
        Token::classify(TokenKind::Operator, "->"),
        Token::classify(TokenKind::Identifier, property.name.as_str()),
        Token::classify(TokenKind::Whitespace, " "),
        Token::classify(TokenKind::Operator, "="),
        Token::classify(TokenKind::Whitespace, " "),
    ];
    for id in chain.span(default.first, default.last)? {
        tokens.push(reindent(chain.token(id)?, &declaration_indent, body_indent));
    }
    tokens.push(Token::classify(TokenKind::Punctuation, ";"));

    Ok(Some(tokens))
}

fn append_to_body(
    chain: &mut Chain,
    body: &CompositeItem,
    constructor_indent: &str,
    body_indent: &str,
    statements: Vec<Vec<Token>>,
) -> Result<(), ChainError> {
    let close = body.close();
    let before_close = chain.previous(close)?;
    let token = chain.token(before_close)?;

    let anchor = if token.is_whitespace() && token.contains_line_break() {
        before_close
    } else {
        let line_break = whitespace(chain, format!("\n{}", constructor_indent))?;
        chain.insert_before(close, line_break)?;
        line_break
    };

    for statement in statements {
        let line_break = whitespace(chain, format!("\n{}", body_indent))?;
        chain.insert_before(anchor, line_break)?;
        for token in statement {
            let node = chain.create_node(token)?;
            chain.insert_before(anchor, node)?;
        }
    }
    Ok(())
}

fn insert_constructor(
    chain: &mut Chain,
    class: &ClassBody,
    member_indent: &str,
    body_indent: &str,
    statements: Vec<Vec<Token>>,
) -> Result<(), ChainError> {
    let Some(terminator) = class.properties().last().map(|property| property.terminator) else {
        return Ok(());
    };
    let anchor = end_of_line(chain, terminator)?;

    let separator = match chain.peek_next(anchor)? {
        Some(next) => {
            let token = chain.token(next)?;
            let ends_at_member_indent = token.text().rsplit('\n').next() == Some(member_indent);
            if token.is_whitespace() && token.contains_line_break() && ends_at_member_indent {
                token.text().to_string()
            } else {
                format!("\n\n{}", member_indent)
            }
        }
        None => format!("\n\n{}", member_indent),
    };

    let mut tokens = vec![
        Token::classify(TokenKind::Whitespace, separator),
        Token::classify(TokenKind::Keyword, "public"),
        Token::classify(TokenKind::Whitespace, " "),
        Token::classify(TokenKind::Keyword, "function"),
        Token::classify(TokenKind::Whitespace, " "),
        Token::classify(TokenKind::Identifier, "__construct"),
        Token::classify(TokenKind::Punctuation, "("),
        Token::classify(TokenKind::Punctuation, ")"),
        Token::classify(TokenKind::Whitespace, format!("\n{}", member_indent)),
        Token::classify(TokenKind::Punctuation, "{"),
    ];

    if class.extends {
        tokens.extend([
            Token::classify(TokenKind::Whitespace, format!("\n{}", body_indent)),
            Token::classify(TokenKind::Identifier, "parent"),
            Token::classify(TokenKind::Operator, "::"),
            Token::classify(TokenKind::Identifier, "__construct"),
            Token::classify(TokenKind::Punctuation, "("),
            Token::classify(TokenKind::Punctuation, ")"),
            Token::classify(TokenKind::Punctuation, ";"),
        ]);
    }

    for statement in statements {
        tokens.push(Token::classify(TokenKind::Whitespace, format!("\n{}", body_indent)));
        tokens.extend(statement);
    }

    tokens.push(Token::classify(TokenKind::Whitespace, format!("\n{}", member_indent)));
    tokens.push(Token::classify(TokenKind::Punctuation, "}"));

    let mut cursor = anchor;
    for token in tokens {
        let node = chain.create_node(token)?;
        chain.insert_after(cursor, node)?;
        cursor = node;
    }
    Ok(())
}

/// Last node on `id`'s line when only whitespace and comments follow it
fn end_of_line(chain: &Chain, id: NodeId) -> Result<NodeId, ChainError> {
    let mut anchor = id;
    let mut current = id;
    for _ in 0..chain.len() {
        let Some(next) = chain.peek_next(current)? else {
            break;
        };
        let token = chain.token(next)?;
        if token.contains_line_break() || token.is_significant() {
            break;
        }
        if token.is_comment() {
            anchor = next;
        }
        current = next;
    }
    Ok(anchor)
}

/// Indent of the constructor's first statement, or one unit deeper than the
/// constructor when the body is empty or on one line
fn constructor_body_indent(
    chain: &Chain,
    body: &CompositeItem,
    constructor_start: NodeId,
    unit: &str,
) -> Result<String, ChainError> {
    let first = chain.next_non_whitespace(body.open())?;
    if first != body.close() && detect_multiline_span(chain, body.open(), first)? {
        return chain.line_indent(first);
    }
    Ok(format!("{}{}", chain.line_indent(constructor_start)?, unit))
}

fn indent_unit(member_indent: &str, class_indent: &str) -> String {
    match member_indent.strip_prefix(class_indent) {
        Some(unit) if !unit.is_empty() => unit.to_string(),
        _ => DEFAULT_INDENT_UNIT.to_string(),
    }
}

/// Shift line starts inside a whitespace token from one indent to another
fn reindent(token: &Token, from: &str, to: &str) -> Token {
    if !token.is_whitespace() || !token.contains_line_break() || from == to {
        return token.clone();
    }

    let mut lines = token.text().split('\n');
    let mut text = lines.next().unwrap_or_default().to_string();
    for line in lines {
        text.push('\n');
        match line.strip_prefix(from) {
            Some(rest) => {
                text.push_str(to);
                text.push_str(rest);
            }
            None => text.push_str(line),
        }
    }
    Token::classify(TokenKind::Whitespace, text)
}

fn whitespace(chain: &mut Chain, text: String) -> Result<NodeId, ChainError> {
    chain.create(TokenKind::Whitespace, text)
}
