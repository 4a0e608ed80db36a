use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = vec![format!(
        "    {} INTEGER PRIMARY KEY AUTOINCREMENT",
        schema.pk_column()
    )];

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let default = col
            .default
            .map(|d| format!(" DEFAULT {}", d))
            .unwrap_or_default();
        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql_type(),
            null_constraint,
            default
        ));
    }

    // Only structural relations are enforced; content links may dangle
    for rel in schema.relations.iter().filter(|r| r.unique) {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {} ({})\n        ON DELETE CASCADE",
            rel.column, rel.table, rel.foreign_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .relations
        .iter()
        .filter(|r| r.unique)
        .map(|rel| {
            format!(
                "CREATE INDEX {}_{} ON {} ({})",
                schema.name, rel.column, schema.name, rel.column
            )
        })
        .collect()
}
