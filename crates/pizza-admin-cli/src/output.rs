//! Terminal rendering of page views

use pizza_admin_core::Entity;
use pizza_admin_view::Cell;
use pizza_admin_view::pages::{ChildTable, DetailView, FieldView, ListRow, ListView};
use std::fmt::Write as _;
use tabled::builder::Builder;
use tabled::settings::Style;

fn table<I, R>(header: R, rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

fn cell_text(cell: &Cell) -> String {
    match &cell.link {
        Some(route) if cell.text.is_empty() => route.to_string(),
        _ => cell.text.clone(),
    }
}

fn actions(edit: bool, delete: bool) -> String {
    match (edit, delete) {
        (true, true) => "edit, delete".to_string(),
        (true, false) => "edit".to_string(),
        (false, true) => "delete".to_string(),
        (false, false) => String::new(),
    }
}

fn list_row(row: &ListRow) -> Vec<String> {
    std::iter::once(row.id.to_string())
        .chain(row.cells.iter().map(cell_text))
        .chain(std::iter::once(actions(row.edit.is_some(), row.can_delete)))
        .collect()
}

/// Collection page as a table with its affordances
#[must_use]
pub fn list(view: &ListView) -> String {
    let mut out = format!("{}\n", view.kind.display_name());

    if view.rows.is_empty() {
        out.push_str("(no records)\n");
    } else {
        let header = std::iter::once("id".to_string())
            .chain(view.columns.iter().cloned())
            .chain(std::iter::once("actions".to_string()));
        out.push_str(&table(header.collect::<Vec<_>>(), view.rows.iter().map(list_row)));
        out.push('\n');
    }

    if let Some(route) = &view.create {
        let _ = writeln!(out, "create: {route}");
    }
    if let Some(error) = &view.delete_error {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

fn child_table(child: &ChildTable) -> String {
    let mut out = format!("{}\n", child.kind.display_name());
    if child.rows.is_empty() {
        out.push_str("(none)\n");
    } else {
        let header = std::iter::once("id".to_string())
            .chain(child.columns.iter().cloned())
            .chain(std::iter::once("actions".to_string()))
            .collect::<Vec<_>>();
        let rows = child.rows.iter().map(|row| {
            std::iter::once(row.id.to_string())
                .chain(row.cells.iter().cloned())
                .chain(std::iter::once(actions(row.edit.is_some(), row.can_delete)))
                .collect::<Vec<_>>()
        });
        out.push_str(&table(header, rows));
        out.push('\n');
    }
    if let Some(route) = &child.create {
        let _ = writeln!(out, "create: {route}");
    }
    out
}

/// Detail page: fields, relation links and child tables
#[must_use]
pub fn detail(view: &DetailView) -> String {
    let mut rows: Vec<Vec<String>> = view
        .fields
        .iter()
        .map(|(label, value)| vec![label.clone(), value.clone()])
        .collect();
    rows.extend(
        view.relations
            .iter()
            .map(|(kind, cell)| vec![kind.display_name().to_string(), cell_text(cell)]),
    );

    let mut out = format!("{}\n", view.kind.display_name());
    out.push_str(&table(vec!["field".to_string(), "value".to_string()], rows));
    out.push('\n');

    if let Some(route) = &view.edit {
        let _ = writeln!(out, "edit: {route}");
    }
    if let Some(error) = &view.delete_error {
        let _ = writeln!(out, "error: {error}");
    }
    for child in &view.children {
        out.push('\n');
        out.push_str(&child_table(child));
    }
    out
}

/// A single stored record
#[must_use]
pub fn record<E: Entity>(record: &E) -> String {
    let rows = record
        .detail_fields()
        .into_iter()
        .map(|(label, value)| vec![label.to_string(), value]);
    table(vec!["field".to_string(), "value".to_string()], rows)
}

/// Validation errors of a form, or `None` when every field is valid
#[must_use]
pub fn field_errors(fields: &[FieldView]) -> Option<String> {
    let rows: Vec<Vec<String>> = fields
        .iter()
        .filter_map(|field| {
            field
                .error
                .as_ref()
                .map(|error| vec![field.label.to_string(), error.clone()])
        })
        .collect();
    if rows.is_empty() {
        None
    } else {
        Some(table(vec!["field".to_string(), "error".to_string()], rows))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pizza_admin_core::{EntityId, EntityKind};
    use pizza_admin_view::Route;
    use pizza_admin_view::pages::ChildTableRow;
    use pretty_assertions::assert_eq;

    fn menu_list(can_update: bool) -> ListView {
        ListView {
            kind: EntityKind::MenuItem,
            create: Some(Route::create(EntityKind::MenuItem)),
            loading: false,
            fetch_error: None,
            delete_error: None,
            columns: vec!["name".into(), "price".into(), "pizza_restaurant".into()],
            rows: vec![ListRow {
                id: EntityId::from("item-1"),
                cells: vec![
                    Cell {
                        text: "Margherita".into(),
                        link: None,
                    },
                    Cell {
                        text: "9.5".into(),
                        link: None,
                    },
                    Cell {
                        text: "Luigi's".into(),
                        link: Some(Route::View(EntityKind::PizzaRestaurant, "r1".into())),
                    },
                ],
                edit: can_update.then(|| Route::Edit(EntityKind::MenuItem, "item-1".into())),
                can_delete: can_update,
            }],
        }
    }

    #[test]
    fn test_list_shows_columns_and_affordances() {
        let out = list(&menu_list(true));
        assert!(out.starts_with("Menu Item\n"));
        assert!(out.contains("pizza_restaurant"));
        assert!(out.contains("Margherita"));
        assert!(out.contains("Luigi's"));
        assert!(out.contains("edit, delete"));
        assert!(out.contains("create: /menu-items/create"));
    }

    #[test]
    fn test_list_without_update_has_no_actions() {
        let out = list(&menu_list(false));
        assert!(!out.contains("edit"));
        assert!(!out.contains("delete"));
    }

    #[test]
    fn test_unexpanded_relation_shows_route() {
        let cell = Cell {
            text: String::new(),
            link: Some(Route::View(EntityKind::User, "u1".into())),
        };
        assert_eq!(cell_text(&cell), "/users/view/u1");
    }

    #[test]
    fn test_detail_lists_children() {
        let view = DetailView {
            kind: EntityKind::Order,
            loading: false,
            fetch_error: None,
            delete_error: Some("delete failed: not found".into()),
            edit: None,
            fields: vec![("Status".into(), "pending".into())],
            relations: vec![],
            children: vec![ChildTable {
                kind: EntityKind::OrderItem,
                columns: vec!["quantity".into()],
                create: Some(Route::create_child(
                    EntityKind::OrderItem,
                    EntityKind::Order,
                    "order-1".into(),
                )),
                rows: vec![ChildTableRow {
                    id: "oi-1".into(),
                    cells: vec!["2".into()],
                    edit: None,
                    can_delete: true,
                }],
            }],
        };

        let out = detail(&view);
        assert!(out.contains("pending"));
        assert!(!out.contains("edit:"));
        assert!(out.contains("error: delete failed: not found"));
        assert!(out.contains("Order Item"));
        assert!(out.contains("create: /order-items/create?order_id=order-1"));
    }

    #[test]
    fn test_field_errors_only_for_invalid_fields() {
        let fields = vec![
            FieldView {
                name: "name",
                label: "Name",
                value: String::new(),
                error: Some("required".into()),
                options: None,
            },
            FieldView {
                name: "price",
                label: "Price",
                value: "9.5".into(),
                error: None,
                options: None,
            },
        ];
        let out = field_errors(&fields).unwrap();
        assert!(out.contains("required"));
        assert!(!out.contains("Price"));

        assert_eq!(field_errors(fields.get(1..).unwrap()), None);
    }
}
