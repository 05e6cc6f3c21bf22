//! Structural view of class bodies
//!
//! Splits a class body into members (properties, methods, everything else)
//! using only top-level items of the body, so nested brackets never leak
//! into member boundaries.

use crate::chain::{Chain, ChainError, NodeId};
use crate::item::{ChainItem, CompositeItem, Item};
use crate::tokens::TokenKind;

#[derive(Debug, Clone)]
pub struct ClassBody {
    pub keyword: NodeId,
    pub extends: bool,
    pub body: CompositeItem,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Property(Property),
    Method(Method),
    Other,
}

/// `<modifiers> [type] $name [= value];`
#[derive(Debug, Clone)]
pub struct Property {
    pub start: NodeId,
    pub variable: NodeId,
    pub name: String,
    pub is_static: bool,
    pub default: Option<DefaultValue>,
    pub terminator: NodeId,
}

/// Value span of a property default, `=` excluded
#[derive(Debug, Clone)]
pub struct DefaultValue {
    pub first: NodeId,
    pub last: NodeId,
    pub is_null: bool,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub start: NodeId,
    pub name: String,
    pub body: Option<CompositeItem>,
}

impl Method {
    pub fn is_constructor(&self) -> bool {
        self.name.eq_ignore_ascii_case("__construct")
    }
}

impl ClassBody {
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.members.iter().filter_map(|member| match member {
            Member::Property(property) => Some(property),
            _ => None,
        })
    }

    pub fn constructor(&self) -> Option<&Method> {
        self.members.iter().find_map(|member| match member {
            Member::Method(method) if method.is_constructor() => Some(method),
            _ => None,
        })
    }
}

/// Named classes in link order; anonymous classes and `::class` are skipped
pub fn find_classes(chain: &Chain) -> Result<Vec<ClassBody>, ChainError> {
    let candidates: Vec<NodeId> = chain
        .iter()
        .filter(|id| chain.token(*id).is_ok_and(|token| token.is_keyword("class")))
        .collect();

    let mut classes = Vec::new();
    for keyword in candidates {
        if let Some(class) = parse_class(chain, keyword)? {
            classes.push(class);
        }
    }
    Ok(classes)
}

fn parse_class(chain: &Chain, keyword: NodeId) -> Result<Option<ClassBody>, ChainError> {
    match chain.previous_non_whitespace(keyword) {
        Ok(before) => {
            let token = chain.token(before)?;
            if token.is_operator("::") || token.is_keyword("new") {
                return Ok(None);
            }
        }
        Err(ChainError::NoSuchNeighbor { .. }) => {}
        Err(error) => return Err(error),
    }

    let mut extends = false;
    let mut current = keyword;
    let open = loop {
        current = match chain.next_non_whitespace(current) {
            Ok(next) => next,
            Err(ChainError::NoSuchNeighbor { .. }) => return Ok(None),
            Err(error) => return Err(error),
        };
        let token = chain.token(current)?;
        if token.is_punctuation('{') {
            break current;
        }
        if token.is_punctuation(';') || token.is_punctuation('(') {
            return Ok(None);
        }
        if token.is_keyword("extends") {
            extends = true;
        }
    };

    let Some(body) = CompositeItem::parse(chain, open)? else {
        return Ok(None);
    };
    let members = scan_members(chain, &body)?;

    Ok(Some(ClassBody {
        keyword,
        extends,
        body,
        members,
    }))
}

fn scan_members(chain: &Chain, body: &CompositeItem) -> Result<Vec<Member>, ChainError> {
    let inner_first = chain.next(body.open())?;
    if inner_first == body.close() {
        return Ok(Vec::new());
    }
    let inner_last = chain.previous(body.close())?;

    let mut members = Vec::new();
    let mut current: Vec<ChainItem> = Vec::new();

    for item in ChainItem::sequence(chain, inner_first, inner_last)? {
        let ends_member = match &item {
            ChainItem::Atomic(id) => {
                let token = chain.token(*id)?;
                if !token.is_significant() {
                    continue;
                }
                token.is_punctuation(';')
            }
            ChainItem::Composite(group) => {
                let opener = chain.token(group.open())?;
                if opener.is_attribute_opener() {
                    continue;
                }
                opener.is_punctuation('{')
            }
        };

        current.push(item);
        if ends_member {
            members.push(classify_member(chain, std::mem::take(&mut current))?);
        }
    }

    Ok(members)
}

fn classify_member(chain: &Chain, items: Vec<ChainItem>) -> Result<Member, ChainError> {
    let Some(start) = items.first().map(Item::first_token) else {
        return Ok(Member::Other);
    };

    let mut atoms = Vec::new();
    for item in &items {
        if let ChainItem::Atomic(id) = item {
            atoms.push((*id, chain.token(*id)?));
        }
    }

    if let Some(position) = atoms.iter().position(|(_, token)| token.is_keyword("function")) {
        let name = atoms[position + 1..]
            .iter()
            .find(|(_, token)| matches!(token.kind(), TokenKind::Identifier | TokenKind::Keyword))
            .map(|(_, token)| token.text().to_string())
            .unwrap_or_default();
        let body = items.iter().rev().find_map(|item| match item {
            ChainItem::Composite(group) if chain.token(group.open()).is_ok_and(|t| t.is_punctuation('{')) => {
                Some(group.clone())
            }
            _ => None,
        });
        return Ok(Member::Method(Method { start, name, body }));
    }

    let declares_other = atoms.iter().any(|(_, token)| {
        token.is_keyword("const") || token.is_keyword("use") || token.is_keyword("case")
    });
    let has_list = atoms.iter().any(|(_, token)| token.is_punctuation(','));
    let Some(variable_index) = items.iter().position(|item| {
        matches!(item, ChainItem::Atomic(id) if chain.token(*id).is_ok_and(|t| t.kind() == TokenKind::Variable))
    }) else {
        return Ok(Member::Other);
    };
    if declares_other || has_list {
        return Ok(Member::Other);
    }

    let variable = items[variable_index].first_token();
    let terminator = items[items.len() - 1].last_token();
    if !chain.token(terminator)?.is_punctuation(';') {
        return Ok(Member::Other);
    }

    let mut is_static = false;
    for item in &items[..variable_index] {
        if let ChainItem::Atomic(id) = item {
            is_static |= chain.token(*id)?.is_keyword("static");
        }
    }

    let value_items = &items[variable_index + 1..items.len() - 1];
    let mut default = None;
    if let Some((ChainItem::Atomic(equals), value)) = value_items.split_first() {
        if chain.token(*equals)?.is_operator("=") {
            if let (Some(first), Some(last)) = (value.first(), value.last()) {
                let is_null = value.len() == 1 && {
                    let token = chain.token(first.first_token())?;
                    token.is_constant_name() && token.text().eq_ignore_ascii_case("null")
                };
                default = Some(DefaultValue {
                    first: first.first_token(),
                    last: last.last_token(),
                    is_null,
                });
            }
        }
    }

    let name = chain.text(variable)?.trim_start_matches('$').to_string();

    Ok(Member::Property(Property {
        start,
        variable,
        name,
        is_static,
        default,
        terminator,
    }))
}
