// tests/support/mocks/entity.rs
use crud_scaffold::domain::{Audit, AuditFields, Column, ColumnKind, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Widget {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub weight: Option<f64>,
}

impl AuditFields for Widget {
    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }
}

impl Entity for Widget {
    const NAME: &'static str = "Widget";
    const TABLE: &'static str = "scaffold_widgets";
    const COLUMNS: &'static [Column] = &[
        Column::new("name", ColumnKind::Text),
        Column::new("weight", ColumnKind::Float),
    ];
}

pub fn widget(name: &str) -> Widget {
    Widget {
        audit: Audit::default(),
        name: name.to_string(),
        weight: None,
    }
}
