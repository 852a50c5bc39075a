use super::*;

#[test]
fn test_canonicalize_strips_transaction_wrapper() {
    let raw = "BEGIN;\nCREATE TABLE users (id INT);\nCOMMIT;\n";
    assert_eq!(canonicalize_query(raw), "CREATE TABLE users (id INT);");
}

#[test]
fn test_canonicalize_strips_frontmatter() {
    let raw = "-- +++\n-- parent: 12\n-- +++\nCREATE TABLE t (id INT);";
    assert_eq!(canonicalize_query(raw), "CREATE TABLE t (id INT);");
}

#[test]
fn test_canonicalize_frontmatter_and_wrapper() {
    let raw = "-- +++\nname: x\n-- +++\n  BEGIN;\nDROP TABLE t;\nCOMMIT;  ";
    assert_eq!(canonicalize_query(raw), "DROP TABLE t;");
}

#[test]
fn test_canonicalize_single_marker_untouched() {
    let raw = "-- +++\nSELECT 1;";
    assert_eq!(canonicalize_query(raw), "-- +++\nSELECT 1;");
}

#[test]
fn test_canonicalize_keeps_percent_signs() {
    let q = SqlQuery::from_file_contents("SELECT * FROM t WHERE name LIKE 'a%';");
    assert_eq!(q.as_str(), "SELECT * FROM t WHERE name LIKE 'a%';");
}

#[test]
fn test_statement_count_single() {
    let q = SqlQuery::new("CREATE INDEX CONCURRENTLY idx ON t (id);");
    assert_eq!(q.statement_count(), 1);
}

#[test]
fn test_statement_count_without_trailing_semicolon() {
    let q = SqlQuery::new("CREATE TABLE a (id INT); CREATE TABLE b (id INT)");
    assert_eq!(q.statement_count(), 2);
}

#[test]
fn test_statement_count_ignores_quoted_semicolons() {
    let q = SqlQuery::new("INSERT INTO t VALUES ('a;b'); -- trailing; comment\n");
    assert_eq!(q.statement_count(), 1);
}

#[test]
fn test_statement_count_dollar_quoted_body() {
    let q = SqlQuery::new(
        "CREATE FUNCTION f() RETURNS int AS $$ SELECT 1; SELECT 2; $$ LANGUAGE sql;",
    );
    assert_eq!(q.statement_count(), 1);
}

#[test]
fn test_statement_count_empty() {
    assert_eq!(SqlQuery::new("  ;; ").statement_count(), 0);
    assert!(SqlQuery::new("  \n").is_empty());
}

#[test]
fn test_comment_only_body_has_no_statements() {
    let q = SqlQuery::from_file_contents(
        "-- Write the forward migration here.\n--\n/* nothing; yet */\n",
    );
    assert!(!q.is_empty());
    assert_eq!(q.statement_count(), 0);
    assert!(!q.has_statements());
    assert!(SqlQuery::new("SELECT 1").has_statements());
}
