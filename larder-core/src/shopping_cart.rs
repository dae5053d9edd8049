//! Shopping cart totals and their CSV export.

use std::collections::HashMap;

use serde::Serialize;

/// One ingredient line of one recipe sitting in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub ingredient_id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Summed amount of one ingredient across every recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartTotal {
    pub ingredient_id: i32,
    pub ingredient_name: String,
    pub total_amount: i64,
    pub measurement_unit: String,
}

/// Groups `lines` by ingredient and sums their amounts.
///
/// Output is ordered by ingredient name, then by ingredient id for equal
/// names. An empty input gives an empty output.
pub fn aggregate<I>(lines: I) -> Vec<CartTotal>
where
    I: IntoIterator<Item = CartLine>,
{
    let mut by_ingredient: HashMap<i32, CartTotal> = HashMap::new();

    for line in lines {
        by_ingredient
            .entry(line.ingredient_id)
            .and_modify(|total| total.total_amount += i64::from(line.amount))
            .or_insert_with(|| CartTotal {
                ingredient_id: line.ingredient_id,
                ingredient_name: line.name,
                total_amount: i64::from(line.amount),
                measurement_unit: line.measurement_unit,
            });
    }

    let mut totals: Vec<CartTotal> = by_ingredient.into_values().collect();
    totals.sort_by(|a, b| {
        a.ingredient_name
            .cmp(&b.ingredient_name)
            .then(a.ingredient_id.cmp(&b.ingredient_id))
    });
    totals
}

pub const CSV_HEADER: [&str; 3] = ["Ingredient", "Amount", "Unit"];

/// Renders cart totals as CSV with a `Ingredient,Amount,Unit` header row.
pub fn render_csv(totals: &[CartTotal]) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_HEADER.iter().copied());

    for total in totals {
        let name = capitalize(&total.ingredient_name);
        let amount = total.total_amount.to_string();
        write_row(
            &mut out,
            [name.as_str(), amount.as_str(), total.measurement_unit.as_str()],
        );
    }

    out
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    let needs_quotes = field.contains([',', '"', '\r', '\n']);
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}

/// Uppercases the first character, leaves the rest alone.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
