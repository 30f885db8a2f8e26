//! Inventory spreadsheet export.

use rust_decimal::prelude::ToPrimitive as _;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use voltmarket_core::inventory::Component;

pub const SHEET_NAME: &str = "Inventory";

const HEADERS: [&str; 5] = ["Component", "MPN", "Price", "Stock", "Status"];

fn status_label(component: &Component) -> &'static str {
  if component.stock == 0 { "Out of stock" } else { "Available" }
}

/// Render `components` as a single-sheet `.xlsx` workbook, one row each
/// below a bold header row.
pub fn inventory_workbook(components: &[Component]) -> Result<Vec<u8>, XlsxError> {
  let mut workbook = Workbook::new();
  let bold = Format::new().set_bold();

  let sheet = workbook.add_worksheet();
  sheet.set_name(SHEET_NAME)?;
  for (col, title) in (0u16..).zip(HEADERS) {
    sheet.write_string_with_format(0, col, title, &bold)?;
  }

  for (row, component) in (1u32..).zip(components) {
    sheet.write_string(row, 0, &component.name)?;
    sheet.write_string(row, 1, &component.mpn)?;
    sheet.write_number(row, 2, component.price.to_f64().unwrap_or_default())?;
    sheet.write_number(row, 3, f64::from(component.stock))?;
    sheet.write_string(row, 4, status_label(component))?;
  }
  sheet.autofit();

  workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;
  use voltmarket_core::inventory::StockStatus;

  use super::*;

  fn component(stock: u32) -> Component {
    Component {
      id:                Uuid::new_v4(),
      store_id:          Uuid::new_v4(),
      store_name:        "Shop".into(),
      category_id:       Uuid::new_v4(),
      category_name:     "Sensors".into(),
      name:              "DHT22".into(),
      mpn:               "AM2302".into(),
      description:       String::new(),
      price:             "4.25".parse().unwrap(),
      stock,
      technical_specs:   Default::default(),
      is_available:      true,
      is_on_offer:       false,
      offer_price:       None,
      datasheet_url:     None,
      image_url:         None,
      created_at:        Utc::now(),
      times_in_wishlist: 0,
      stock_status:      StockStatus::from_stock(stock),
    }
  }

  #[test]
  fn status_follows_stock() {
    assert_eq!(status_label(&component(0)), "Out of stock");
    assert_eq!(status_label(&component(1)), "Available");
  }

  #[test]
  fn workbook_is_a_zip_container() {
    let bytes = inventory_workbook(&[component(0), component(12)]).unwrap();
    assert!(bytes.starts_with(b"PK"));
  }

  #[test]
  fn empty_inventory_still_has_headers() {
    let bytes = inventory_workbook(&[]).unwrap();
    assert!(!bytes.is_empty());
  }
}
