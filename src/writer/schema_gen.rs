use crate::schema::{Column, TableSchema};

fn column_definition(col: &Column) -> String {
    let mut def = format!("    {} {}", col.name, col.col_type.sql_type());

    if col.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    if !col.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(expr) = col.default {
        def.push_str(&format!(" DEFAULT {}", expr));
    }
    if let Some(values) = col.allowed {
        let quoted: Vec<String> = values
            .iter()
            .map(|v| format!("'{}'", v.replace('\'', "''")))
            .collect();
        def.push_str(&format!(" CHECK ({} IN ({}))", col.name, quoted.join(", ")));
    }

    def
}

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns: Vec<String> = schema.all_columns().map(column_definition).collect();

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for explicit indexes and foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let explicit = schema.indexes.iter().map(|index| {
        format!(
            "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            if index.unique { "UNIQUE " } else { "" },
            schema.name,
            index.columns.join("_"),
            schema.name,
            index.columns.join(", ")
        )
    });

    let foreign = schema.foreign_keys.iter().map(|fk| {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            schema.name, fk.column, schema.name, fk.column
        )
    });

    explicit.chain(foreign).collect()
}
