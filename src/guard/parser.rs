//! Parser-backed read-only rules.
//!
//! Uses sqlparser-rs with the SQLite dialect. The query must parse into
//! exactly one statement, and that statement must be a query whose body
//! contains no data-modifying statement anywhere (CTEs, set operations,
//! derived tables, nested joins).

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use super::GuardRejection;

/// Parses the raw query and checks it is a single read-only statement.
pub(super) fn check(sql: &str) -> Result<(), GuardRejection> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql)
        .map_err(|e| GuardRejection::Unparseable(e.to_string()))?;

    match statements.as_slice() {
        [statement] => check_statement(statement),
        [] => Err(GuardRejection::Unparseable("empty statement".to_string())),
        _ => Err(GuardRejection::MultipleStatements),
    }
}

/// Leading keyword of a rendered AST node, for rejection messages.
fn leading_keyword(rendered: &str) -> String {
    rendered
        .split_whitespace()
        .next()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
}

fn check_statement(statement: &Statement) -> Result<(), GuardRejection> {
    match statement {
        Statement::Query(query) => check_query(query),
        other => Err(GuardRejection::NotReadOnly(leading_keyword(
            &other.to_string(),
        ))),
    }
}

/// Walks a query, including its CTEs.
fn check_query(query: &Query) -> Result<(), GuardRejection> {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            check_query(&cte.query)?;
        }
    }
    check_set_expr(&query.body)
}

fn check_set_expr(set_expr: &SetExpr) -> Result<(), GuardRejection> {
    match set_expr {
        SetExpr::Select(select) => check_select(select),
        SetExpr::Query(query) => check_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            check_set_expr(left)?;
            check_set_expr(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => Ok(()),
        // INSERT/UPDATE/DELETE/MERGE bodies
        other => Err(GuardRejection::NotReadOnly(leading_keyword(
            &other.to_string(),
        ))),
    }
}

fn check_select(select: &Select) -> Result<(), GuardRejection> {
    select.from.iter().try_for_each(check_table_with_joins)
}

fn check_table_with_joins(twj: &TableWithJoins) -> Result<(), GuardRejection> {
    check_table_factor(&twj.relation)?;
    twj.joins
        .iter()
        .try_for_each(|join| check_table_factor(&join.relation))
}

fn check_table_factor(factor: &TableFactor) -> Result<(), GuardRejection> {
    match factor {
        TableFactor::Derived { subquery, .. } => check_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => check_table_with_joins(table_with_joins),
        _ => Ok(()),
    }
}
