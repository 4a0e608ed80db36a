/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    /// Filesystem path stored as a forward-slash string
    Path,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text | ColumnType::Path => "TEXT",
        }
    }
}

/// Column definition
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// Raw SQL default expression
    pub default: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            default: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            default: None,
        }
    }

    pub const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

/// A relation declared on the owning table, pointing at another table.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub column: &'static str,
    pub table: &'static str,
    pub foreign_column: &'static str,
    /// The relation always resolves (child row to its owning parent row)
    pub unique: bool,
}

impl Relation {
    /// Structural link, usually `<Parent>_fk -> <Parent>_pk`
    pub const fn unique(
        column: &'static str,
        table: &'static str,
        foreign_column: &'static str,
    ) -> Self {
        Self {
            column,
            table,
            foreign_column,
            unique: true,
        }
    }

    /// Content-based link (e.g. two records sharing an identifier) that may
    /// not resolve at query time
    pub const fn shared(
        column: &'static str,
        table: &'static str,
        foreign_column: &'static str,
    ) -> Self {
        Self {
            column,
            table,
            foreign_column,
            unique: false,
        }
    }
}

/// A relation between two tables with both endpoints spelled out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDeclaration {
    pub from_table: &'static str,
    pub from_column: &'static str,
    pub to_table: &'static str,
    pub to_column: &'static str,
    pub unique: bool,
}

impl RelationDeclaration {
    /// The same relation seen from the other end
    pub fn reversed(&self) -> Self {
        Self {
            from_table: self.to_table,
            from_column: self.to_column,
            to_table: self.from_table,
            to_column: self.from_column,
            unique: self.unique,
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    /// Declared columns; the `<name>_pk` primary key is implicit
    pub columns: &'static [Column],
    pub relations: &'static [Relation],
}

impl TableSchema {
    pub fn pk_column(&self) -> String {
        format!("{}_pk", self.name)
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True for declared columns and the implicit primary key
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
            || name
                .strip_prefix(self.name)
                .is_some_and(|rest| rest == "_pk")
    }

    /// Relations owned by this table, with the owning side filled in
    pub fn declarations(&self) -> impl Iterator<Item = RelationDeclaration> + '_ {
        self.relations.iter().map(|r| RelationDeclaration {
            from_table: self.name,
            from_column: r.column,
            to_table: r.table,
            to_column: r.foreign_column,
            unique: r.unique,
        })
    }

    /// Tables this one holds a structural foreign key to
    pub fn parents(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.relations.iter().filter(|r| r.unique).map(|r| r.table)
    }
}
