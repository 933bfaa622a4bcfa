//! Parse MIB source using PEST and hand each statement to a [`StatementSink`] in file order.

use crate::ast::*;
use crate::error::CompileError;
use pest::error::{ErrorVariant, LineColLocation};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct MibParser;

/// Semantic actions invoked once per recognized statement, in source order.
///
/// The [`Registry`](crate::registry::Registry) implements this to register nodes while
/// parsing; [`MibModule`] implements it to simply collect the records.
pub trait StatementSink {
    /// IMPORTS do not affect code generation; ignored unless a sink wants them.
    fn imports(&mut self, _imports: Vec<Import>) -> Result<(), CompileError> {
        Ok(())
    }

    fn module_identity(&mut self, def: ModuleIdentity) -> Result<(), CompileError>;

    fn object_identifier(&mut self, def: ObjectIdentifier) -> Result<(), CompileError>;

    fn object_type(&mut self, def: ObjectType) -> Result<(), CompileError>;

    /// Row shape declarations carry nothing the registry needs.
    fn sequence(&mut self, _def: SequenceType) -> Result<(), CompileError> {
        Ok(())
    }

    fn notification_type(&mut self, def: NotificationType) -> Result<(), CompileError>;
}

impl StatementSink for MibModule {
    fn imports(&mut self, imports: Vec<Import>) -> Result<(), CompileError> {
        self.statements.push(Statement::Imports(imports));
        Ok(())
    }

    fn module_identity(&mut self, def: ModuleIdentity) -> Result<(), CompileError> {
        self.statements.push(Statement::ModuleIdentity(def));
        Ok(())
    }

    fn object_identifier(&mut self, def: ObjectIdentifier) -> Result<(), CompileError> {
        self.statements.push(Statement::ObjectIdentifier(def));
        Ok(())
    }

    fn object_type(&mut self, def: ObjectType) -> Result<(), CompileError> {
        self.statements.push(Statement::ObjectType(def));
        Ok(())
    }

    fn sequence(&mut self, def: SequenceType) -> Result<(), CompileError> {
        self.statements.push(Statement::Sequence(def));
        Ok(())
    }

    fn notification_type(&mut self, def: NotificationType) -> Result<(), CompileError> {
        self.statements.push(Statement::NotificationType(def));
        Ok(())
    }
}

/// Parse MIB source into its statement records.
pub fn parse(source: &str) -> Result<MibModule, CompileError> {
    let mut module = MibModule::default();
    let name = parse_with(source, &mut module)?;
    module.name = name;
    Ok(module)
}

/// Parse MIB source, feeding each statement to `sink` as soon as it is built.
/// Returns the module name. Stops at the first error, grammar or semantic.
pub fn parse_with<S: StatementSink>(source: &str, sink: &mut S) -> Result<String, CompileError> {
    let pairs = MibParser::parse(Rule::mib, source).map_err(|e| syntax_error(source, e))?;
    let pair = pairs.into_iter().next().ok_or_else(|| CompileError::Syntax {
        line: 1,
        column: 1,
        message: "empty parse".to_string(),
        snippet: snippet(source, 1, 1),
    })?;

    let mut module_name = String::new();
    for inner in pair.into_inner() {
        let loc = location(&inner);
        let at = |message: String| invalid(source, loc, message);
        match inner.as_rule() {
            Rule::module_name => module_name = inner.as_str().trim().to_string(),
            Rule::imports => sink.imports(build_imports(inner))?,
            Rule::module_identity => sink.module_identity(build_module_identity(inner).map_err(at)?)?,
            Rule::object_identifier => {
                sink.object_identifier(build_object_identifier(inner).map_err(at)?)?
            }
            Rule::object_type => sink.object_type(build_object_type(inner).map_err(at)?)?,
            Rule::sequence_def => sink.sequence(build_sequence(inner).map_err(at)?)?,
            Rule::notification_type => {
                sink.notification_type(build_notification_type(inner).map_err(at)?)?
            }
            _ => {}
        }
    }
    Ok(module_name)
}

fn location(pair: &pest::iterators::Pair<Rule>) -> Location {
    let (line, column) = pair.as_span().start_pos().line_col();
    Location { line, column }
}

fn invalid(source: &str, loc: Location, message: String) -> CompileError {
    CompileError::Syntax {
        line: loc.line,
        column: loc.column,
        message,
        snippet: snippet(source, loc.line, loc.column),
    }
}

fn syntax_error(source: &str, e: pest::error::Error<Rule>) -> CompileError {
    let (line, column) = match e.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    let message = match &e.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let mut expected: Vec<&str> = positives.iter().map(rule_label).collect();
            expected.dedup();
            format!("expected {}", expected.join(", "))
        }
        ErrorVariant::ParsingError { .. } => "unexpected input".to_string(),
        ErrorVariant::CustomError { message } => message.clone(),
    };
    CompileError::Syntax {
        line,
        column,
        message,
        snippet: snippet(source, line, column),
    }
}

/// The offending line and a caret under `column`. Tabs are kept so the caret lines up.
fn snippet(source: &str, line: usize, column: usize) -> String {
    let text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let pad: String = text
        .chars()
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    format!("{}\n{}^", text, pad)
}

fn rule_label(rule: &Rule) -> &'static str {
    match rule {
        Rule::identifier => "identifier",
        Rule::number | Rule::sub_id => "number",
        Rule::text => "quoted text",
        Rule::oid_assignment => "`{ parent subId }`",
        Rule::kw_definitions => "DEFINITIONS",
        Rule::kw_begin => "BEGIN",
        Rule::kw_end => "END",
        Rule::kw_from => "FROM",
        Rule::kw_object => "OBJECT",
        Rule::kw_identifier => "IDENTIFIER",
        Rule::kw_object_type => "OBJECT-TYPE",
        Rule::kw_module_identity => "MODULE-IDENTITY",
        Rule::kw_notification_type => "NOTIFICATION-TYPE",
        Rule::kw_sequence => "SEQUENCE",
        Rule::syntax_clause | Rule::kw_syntax => "SYNTAX",
        Rule::access_clause | Rule::kw_access | Rule::kw_max_access => "ACCESS or MAX-ACCESS",
        Rule::status_clause | Rule::kw_status => "STATUS",
        Rule::description_clause | Rule::kw_description => "DESCRIPTION",
        Rule::syntax => "syntax",
        Rule::range => "range",
        Rule::EOI => "end of input",
        _ => "statement",
    }
}

// ==================== Statements ====================

fn build_imports(pair: pest::iterators::Pair<Rule>) -> Vec<Import> {
    let mut imports = Vec::new();
    for clause in pair.into_inner() {
        if clause.as_rule() != Rule::import_clause {
            continue;
        }
        let mut names: Vec<String> = clause
            .into_inner()
            .filter(|p| p.as_rule() == Rule::identifier)
            .map(|p| p.as_str().to_string())
            .collect();
        // Last identifier is the module after FROM.
        if let Some(from) = names.pop() {
            imports.push(Import { symbols: names, from });
        }
    }
    imports
}

fn build_module_identity(pair: pest::iterators::Pair<Rule>) -> Result<ModuleIdentity, String> {
    let location = location(&pair);
    let mut name = String::new();
    let mut last_updated = String::new();
    let mut organization = String::new();
    let mut contact_info = String::new();
    let mut description = String::new();
    let mut revisions = Vec::new();
    let mut assignment = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::last_updated_clause => last_updated = clause_text(inner)?,
            Rule::organization_clause => organization = clause_text(inner)?,
            Rule::contact_info_clause => contact_info = clause_text(inner)?,
            Rule::description_clause => description = clause_text(inner)?,
            Rule::revision_clause => {
                let mut texts = inner
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::text)
                    .map(|p| unquote(p.as_str()));
                let date = texts.next().ok_or("REVISION: missing date")?;
                let description = texts.next().ok_or("REVISION: missing DESCRIPTION")?;
                revisions.push(Revision { date, description });
            }
            Rule::oid_assignment => assignment = Some(build_assignment(inner)?),
            _ => {}
        }
    }
    Ok(ModuleIdentity {
        name,
        last_updated,
        organization,
        contact_info,
        description,
        revisions,
        assignment: assignment.ok_or("MODULE-IDENTITY: missing OID assignment")?,
        location,
    })
}

fn build_object_identifier(pair: pest::iterators::Pair<Rule>) -> Result<ObjectIdentifier, String> {
    let location = location(&pair);
    let mut name = String::new();
    let mut assignment = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::oid_assignment => assignment = Some(build_assignment(inner)?),
            _ => {}
        }
    }
    Ok(ObjectIdentifier {
        name,
        assignment: assignment.ok_or("OBJECT IDENTIFIER: missing OID assignment")?,
        location,
    })
}

fn build_object_type(pair: pest::iterators::Pair<Rule>) -> Result<ObjectType, String> {
    let location = location(&pair);
    let mut name = String::new();
    let mut syntax = None;
    let mut units = None;
    let mut access = Access::NotAccessible;
    let mut status = String::new();
    let mut description = None;
    let mut reference = None;
    let mut index = Vec::new();
    let mut defval = None;
    let mut assignment = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::syntax_clause => {
                let s = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::syntax)
                    .ok_or("SYNTAX: missing type")?;
                syntax = Some(build_syntax(s)?);
            }
            Rule::units_clause => units = Some(clause_text(inner)?),
            Rule::access_clause => access = Access::from_keyword(&clause_ident(inner)?),
            Rule::status_clause => status = clause_ident(inner)?,
            Rule::description_clause => description = Some(clause_text(inner)?),
            Rule::reference_clause => reference = Some(clause_text(inner)?),
            Rule::index_clause => {
                for item in inner.into_inner() {
                    if item.as_rule() != Rule::index_item {
                        continue;
                    }
                    let mut implied = false;
                    let mut item_name = String::new();
                    for part in item.into_inner() {
                        match part.as_rule() {
                            Rule::kw_implied => implied = true,
                            Rule::identifier => item_name = part.as_str().to_string(),
                            _ => {}
                        }
                    }
                    index.push(IndexItem {
                        name: item_name,
                        implied,
                    });
                }
            }
            Rule::defval_clause => {
                defval = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::defval_value)
                    .map(|p| p.as_str().trim().to_string());
            }
            Rule::oid_assignment => assignment = Some(build_assignment(inner)?),
            _ => {}
        }
    }

    Ok(ObjectType {
        name,
        syntax: syntax.ok_or("OBJECT-TYPE: missing SYNTAX")?,
        units,
        access,
        status,
        description,
        reference,
        index,
        defval,
        assignment: assignment.ok_or("OBJECT-TYPE: missing OID assignment")?,
        location,
    })
}

fn build_sequence(pair: pest::iterators::Pair<Rule>) -> Result<SequenceType, String> {
    let location = location(&pair);
    let mut name = String::new();
    let mut fields = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::sequence_field => {
                let mut it = inner.into_inner();
                let field = it.next().ok_or("SEQUENCE field: name")?.as_str().to_string();
                let syntax = it.next().ok_or("SEQUENCE field: syntax")?;
                fields.push((field, build_syntax(syntax)?));
            }
            _ => {}
        }
    }
    Ok(SequenceType {
        name,
        fields,
        location,
    })
}

fn build_notification_type(pair: pest::iterators::Pair<Rule>) -> Result<NotificationType, String> {
    let location = location(&pair);
    let mut name = String::new();
    let mut objects = Vec::new();
    let mut access = None;
    let mut status = String::new();
    let mut description = None;
    let mut reference = None;
    let mut assignment = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::objects_clause => {
                objects = inner
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::identifier)
                    .map(|p| p.as_str().to_string())
                    .collect();
            }
            Rule::access_clause => access = Some(Access::from_keyword(&clause_ident(inner)?)),
            Rule::status_clause => status = clause_ident(inner)?,
            Rule::description_clause => description = Some(clause_text(inner)?),
            Rule::reference_clause => reference = Some(clause_text(inner)?),
            Rule::oid_assignment => assignment = Some(build_assignment(inner)?),
            _ => {}
        }
    }
    Ok(NotificationType {
        name,
        objects,
        access,
        status,
        description,
        reference,
        assignment: assignment.ok_or("NOTIFICATION-TYPE: missing OID assignment")?,
        location,
    })
}

// ==================== Clauses ====================

fn build_assignment(pair: pest::iterators::Pair<Rule>) -> Result<OidAssignment, String> {
    let mut it = pair.into_inner();
    let parent = it.next().ok_or("OID assignment: parent")?.as_str().to_string();
    let sub = it.next().ok_or("OID assignment: sub-identifier")?;
    let sub_id = sub
        .as_str()
        .parse::<u32>()
        .map_err(|_| format!("sub-identifier {} out of range", sub.as_str()))?;
    Ok(OidAssignment { parent, sub_id })
}

fn build_syntax(pair: pest::iterators::Pair<Rule>) -> Result<Syntax, String> {
    let inner = pair.into_inner().next().ok_or("Empty syntax")?;
    match inner.as_rule() {
        Rule::syn_object_id => Ok(Syntax::ObjectIdentifier),
        Rule::syn_octet_string => {
            let size = inner
                .into_inner()
                .find(|p| p.as_rule() == Rule::size_constraint)
                .map(build_size)
                .transpose()?;
            Ok(Syntax::OctetString { size })
        }
        Rule::syn_sequence_of => {
            let row = inner
                .into_inner()
                .find(|p| p.as_rule() == Rule::identifier)
                .ok_or("SEQUENCE OF: missing row type")?;
            Ok(Syntax::SequenceOf(row.as_str().to_string()))
        }
        Rule::syn_named => {
            let mut name = String::new();
            let mut enums = Vec::new();
            let mut bounds = None;
            for part in inner.into_inner() {
                match part.as_rule() {
                    Rule::identifier => name = part.as_str().to_string(),
                    Rule::enum_list => enums = build_enums(part)?,
                    Rule::size_constraint => bounds = Some(build_size(part)?),
                    Rule::range_constraint => bounds = Some(build_ranges(part, BoundsKind::Value)?),
                    _ => {}
                }
            }
            Ok(Syntax::Named {
                name,
                enums,
                bounds,
            })
        }
        _ => Err(format!("Unhandled syntax rule: {:?}", inner.as_rule())),
    }
}

fn build_enums(pair: pest::iterators::Pair<Rule>) -> Result<Vec<(String, i64)>, String> {
    let mut enums = Vec::new();
    for item in pair.into_inner() {
        if item.as_rule() != Rule::enum_item {
            continue;
        }
        let mut it = item.into_inner();
        let label = it.next().ok_or("enum item: name")?.as_str().to_string();
        let value = parse_number(it.next().ok_or("enum item: value")?.as_str())?;
        enums.push((label, value));
    }
    Ok(enums)
}

fn build_size(pair: pest::iterators::Pair<Rule>) -> Result<Bounds, String> {
    let ranges = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::range_constraint)
        .ok_or("SIZE: missing range")?;
    build_ranges(ranges, BoundsKind::Size)
}

fn build_ranges(pair: pest::iterators::Pair<Rule>, kind: BoundsKind) -> Result<Bounds, String> {
    let mut ranges = Vec::new();
    for part in pair.into_inner() {
        if part.as_rule() != Rule::range {
            continue;
        }
        let mut nums = part.into_inner();
        let lo = parse_number(nums.next().ok_or("range: lower bound")?.as_str())?;
        let hi = match nums.next() {
            Some(p) => parse_number(p.as_str())?,
            None => lo,
        };
        ranges.push((lo, hi));
    }
    if ranges.is_empty() {
        return Err("range constraint must have at least one range".to_string());
    }
    Ok(Bounds { kind, ranges })
}

/// Bounds such as Counter64's upper limit do not fit i64; they saturate.
fn parse_number(s: &str) -> Result<i64, String> {
    let n: i128 = s.parse().map_err(|_| format!("invalid number: {}", s))?;
    Ok(n.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

fn clause_text(pair: pest::iterators::Pair<Rule>) -> Result<String, String> {
    let rule = pair.as_rule();
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::text)
        .map(|p| unquote(p.as_str()))
        .ok_or_else(|| format!("{:?}: missing text", rule))
}

fn clause_ident(pair: pest::iterators::Pair<Rule>) -> Result<String, String> {
    let rule = pair.as_rule();
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::identifier)
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| format!("{:?}: missing value", rule))
}

/// Strip the quotes of an ASN.1 string; `""` inside stands for one quote.
fn unquote(s: &str) -> String {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s);
    inner.replace("\"\"", "\"")
}
