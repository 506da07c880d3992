//! Table schema derived from a model, and the statements generated from it.

use crate::sorm::{Model, SormError, SqlType, SqlValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub sql_type: SqlType,
    pub name: String,
    pub value: SqlValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub pk: Option<Column>,
    pub columns: Vec<Column>,
}

impl Table {
    /// Build the table for `model`.
    ///
    /// Untagged fields are skipped. The first field whose tag option is
    /// `pk` becomes the primary key; a later `pk` is an ordinary column.
    pub fn from_model<M: Model>(model: &M) -> Self {
        let mut table = Table {
            name: M::type_name().to_lowercase(),
            pk: None,
            columns: Vec::new(),
        };

        for field in model.fields() {
            let Some((name, option)) = field.column() else {
                continue;
            };
            let column = Column {
                sql_type: field.kind.sql_type().affinity(),
                name: name.to_string(),
                value: field.value,
            };
            if option == "pk" && table.pk.is_none() {
                table.pk = Some(column);
            } else {
                table.columns.push(column);
            }
        }
        table
    }

    fn require_pk(&self) -> Result<&Column, SormError> {
        self.pk
            .as_ref()
            .ok_or_else(|| SormError::NoPrimaryKey(self.name.clone()))
    }

    /// Primary key column followed by the other columns.
    pub fn column_names(&self) -> Vec<&str> {
        self.pk
            .iter()
            .chain(&self.columns)
            .map(|column| column.name.as_str())
            .collect()
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }

    pub fn create_sql(&self) -> String {
        let mut defs = Vec::with_capacity(self.columns.len() + 1);
        if let Some(pk) = &self.pk {
            defs.push(format!("\t\"{}\" {} NOT NULL PRIMARY KEY", pk.name, pk.sql_type));
        }
        for column in &self.columns {
            defs.push(format!("\t\"{}\" {} NOT NULL", column.name, column.sql_type));
        }
        format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n);", self.name, defs.join(",\n"))
    }

    /// `SELECT` over the whole table; `"all"` selects `*`.
    pub fn select_sql(&self, selector: &str) -> String {
        let selector = if selector == "all" { "*" } else { selector };
        match &self.pk {
            Some(pk) => format!("SELECT {} FROM {} ORDER BY {};", selector, self.name, pk.name),
            None => format!("SELECT {} FROM {};", selector, self.name),
        }
    }

    pub fn select_one_sql(&self) -> Result<String, SormError> {
        let pk = self.require_pk()?;
        Ok(format!("SELECT * FROM {} WHERE {}=?;", self.name, pk.name))
    }

    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let marks = vec!["?"; names.len()].join(",");
        format!("INSERT INTO {}({}) VALUES ({});", self.name, names.join(", "), marks)
    }

    /// Insert or overwrite the row with the key bound first.
    pub fn replace_sql(&self) -> Result<String, SormError> {
        self.require_pk()?;
        let names = self.column_names();
        let marks = vec!["?"; names.len()].join(",");
        Ok(format!(
            "INSERT OR REPLACE INTO {}({}) VALUES ({});",
            self.name,
            names.join(", "),
            marks
        ))
    }

    pub fn update_sql(&self) -> Result<String, SormError> {
        let pk = self.require_pk()?;
        let sets: Vec<String> = self.columns.iter().map(|c| format!("{}=?", c.name)).collect();
        Ok(format!(
            "UPDATE {} SET {} WHERE {}=?;",
            self.name,
            sets.join(", "),
            pk.name
        ))
    }

    pub fn delete_sql(&self) -> Result<String, SormError> {
        let pk = self.require_pk()?;
        Ok(format!("DELETE FROM {} WHERE {}=?;", self.name, pk.name))
    }

    /// Values bound by [`Table::insert_sql`].
    pub fn insert_params(&self) -> Vec<SqlValue> {
        self.columns.iter().map(|c| c.value.clone()).collect()
    }

    /// Values bound by [`Table::replace_sql`]: the key, then the columns.
    pub fn replace_params(&self) -> Result<Vec<SqlValue>, SormError> {
        let pk = self.require_pk()?;
        let mut params = vec![pk.value.clone()];
        params.extend(self.insert_params());
        Ok(params)
    }

    /// Values bound by [`Table::update_sql`]: the columns, then the key.
    pub fn update_params(&self) -> Result<Vec<SqlValue>, SormError> {
        let pk = self.require_pk()?;
        let mut params = self.insert_params();
        params.push(pk.value.clone());
        Ok(params)
    }
}
