//! DDL and INSERT fragment rendering.

use crate::compile::SqlBuilder;
use crate::schema::{Column, Key, Table};
use crate::value::{Row, SqlValue};

impl SqlBuilder {
    /// Renders one column definition:
    /// `<name> <TYPE>(<params>)? [UNSIGNED] NULL|NOT NULL
    /// [DEFAULT <escaped>] [AUTO_INCREMENT] [COMMENT <escaped>]`.
    ///
    /// Fields are omitted when not applicable: no type params means no
    /// parens, a `None`/NULL default is not rendered, an empty comment
    /// is skipped.
    #[must_use]
    pub fn build_column_sql(&self, column: &Column) -> String {
        let mut sql = self.escape_identifier([column.name.as_str()]);
        sql.push(' ');
        sql.push_str(&column.data_type.to_uppercase());
        if !column.type_params.is_empty() {
            let params: Vec<String> = column.type_params.iter().map(|p| self.escape(p)).collect();
            sql.push('(');
            sql.push_str(&params.join(","));
            sql.push(')');
        }
        if column.unsigned {
            sql.push(' ');
            sql.push_str(&self.options().unsigned_keyword);
        }
        sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        if let Some(default) = &column.default_value {
            if !default.is_null() {
                sql.push_str(" DEFAULT ");
                sql.push_str(&self.escape(default));
            }
        }
        if column.generated {
            sql.push(' ');
            sql.push_str(&self.options().generated_keyword);
        }
        if !column.comment.is_empty() {
            sql.push_str(" COMMENT ");
            sql.push_str(&self.escape(&SqlValue::Text(column.comment.clone())));
        }
        sql
    }

    /// Renders the keyword-and-name prefix of a key definition. The
    /// primary key is unnamed: its identifier is never rendered.
    #[must_use]
    pub fn build_key_identifier_sql(&self, key: &Key) -> String {
        let keyword = self
            .options()
            .key_map
            .get(&key.kind())
            .map_or("KEY", String::as_str);
        match key {
            Key::Primary(_) => String::from(keyword),
            other => format!(
                "{keyword} {}",
                self.escape_identifier([other.name()])
            ),
        }
    }

    /// Renders a full key definition:
    /// `<KEYWORD> [name](<columns>)`, plus
    /// `REFERENCES <table>(<columns>)` and conditional
    /// `ON DELETE`/`ON UPDATE` rules for foreign keys. Rules equal to
    /// `NO ACTION` are omitted.
    #[must_use]
    pub fn build_key_sql(&self, key: &Key) -> String {
        let columns: Vec<String> = key
            .column_names()
            .iter()
            .map(|name| self.escape_identifier([name.as_str()]))
            .collect();
        let mut sql = format!(
            "{}({})",
            self.build_key_identifier_sql(key),
            columns.join(",")
        );
        if let Key::Foreign(fk) = key {
            let referenced: Vec<String> = fk
                .referenced_columns
                .iter()
                .map(|name| self.escape_identifier([name.as_str()]))
                .collect();
            sql.push_str(&format!(
                " REFERENCES {}({})",
                self.escape_identifier([fk.referenced_table.as_str()]),
                referenced.join(",")
            ));
            if fk.on_delete != crate::schema::ForeignKeyRule::NoAction {
                sql.push_str(&format!(" ON DELETE {}", fk.on_delete));
            }
            if fk.on_update != crate::schema::ForeignKeyRule::NoAction {
                sql.push_str(&format!(" ON UPDATE {}", fk.on_update));
            }
        }
        sql
    }

    /// Renders a full CREATE TABLE statement: every column definition,
    /// then every key definition, comma-joined, followed by the
    /// configured table options.
    #[must_use]
    pub fn build_create_table_sql(&self, database_name: &str, table: &Table) -> String {
        let mut parts: Vec<String> = table
            .columns
            .iter()
            .map(|column| self.build_column_sql(column))
            .collect();
        parts.extend(table.keys.iter().map(|key| self.build_key_sql(key)));
        let mut sql = format!(
            "CREATE TABLE {}{}",
            self.escape_identifier([database_name, table.name.as_str()]),
            self.build_array_sql(&parts)
        );
        if !self.options().table_options.is_empty() {
            sql.push(' ');
            sql.push_str(&self.options().table_options);
        }
        sql
    }

    /// Renders a single-row INSERT in the `SET` form.
    #[must_use]
    pub fn build_insert_into_sql(
        &self,
        database_name: &str,
        table_name: &str,
        row: &Row,
    ) -> String {
        format!(
            "INSERT INTO {} SET {}",
            self.escape_identifier([database_name, table_name]),
            self.build_map_sql(row)
        )
    }

    /// Renders a multi-row INSERT.
    ///
    /// The column list is the union of all row keys in first-seen order
    /// across rows. Rows missing a column are null-filled at that
    /// position, so heterogeneous rows are accepted.
    #[must_use]
    pub fn build_insert_into_multiple_sql(
        &self,
        database_name: &str,
        table_name: &str,
        rows: &[Row],
    ) -> String {
        let mut column_names: Vec<&str> = Vec::new();
        for row in rows {
            for (name, _) in row {
                if !column_names.contains(&name.as_str()) {
                    column_names.push(name);
                }
            }
        }
        let columns: Vec<String> = column_names
            .iter()
            .map(|name| self.escape_identifier([*name]))
            .collect();
        let values: Vec<String> = rows
            .iter()
            .map(|row| {
                let aligned: Vec<String> = column_names
                    .iter()
                    .map(|name| {
                        row.iter()
                            .find(|(key, _)| key == name)
                            .map_or_else(|| String::from("NULL"), |(_, value)| self.escape(value))
                    })
                    .collect();
                self.build_array_sql(&aligned)
            })
            .collect();
        format!(
            "INSERT INTO {}{} VALUES {}",
            self.escape_identifier([database_name, table_name]),
            self.build_array_sql(&columns),
            self.build_list_sql(&values)
        )
    }
}
