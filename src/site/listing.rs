//! Pagination and year/month filtering for entry listings.

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use crate::types::EntryFilter;

pub const MONTHS_ES: [&str; 12] = [
  "Enero",
  "Febrero",
  "Marzo",
  "Abril",
  "Mayo",
  "Junio",
  "Julio",
  "Agosto",
  "Septiembre",
  "Octubre",
  "Noviembre",
  "Diciembre",
];

/// Spanish month name for 1..=12
pub fn month_name(month: u32) -> Option<&'static str> {
  MONTHS_ES.get(month.checked_sub(1)? as usize).copied()
}

/// "17 de octubre de 2026"
pub fn long_date(date: DateTime<Utc>) -> String {
  let month = month_name(date.month()).unwrap_or("mes desconocido");
  format!(
    "{} de {} de {}",
    date.day(),
    month.to_lowercase(),
    date.year()
  )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
  #[error("page number is not an integer")]
  NotAnInteger,
  #[error("page number is less than 1")]
  LessThanOne,
  #[error("page contains no results")]
  Empty,
}

/// Splits `count` items into pages of `per_page`
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
  pub count: u64,
  pub per_page: usize,
}

/// A validated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub number: u64,
  pub num_pages: u64,
  pub offset: usize,
  pub limit: usize,
}

impl Page {
  pub fn has_previous(&self) -> bool {
    self.number > 1
  }

  pub fn has_next(&self) -> bool {
    self.number < self.num_pages
  }
}

impl Paginator {
  pub fn new(count: u64, per_page: usize) -> Self {
    Self {
      count,
      per_page: per_page.max(1),
    }
  }

  /// Always at least one page, even when empty
  pub fn num_pages(&self) -> u64 {
    if self.count == 0 {
      1
    } else {
      self.count.div_ceil(self.per_page as u64)
    }
  }

  /// Resolve the raw `page` query value. `None` means the first page and
  /// `"last"` the final one.
  pub fn page(&self, raw: Option<&str>) -> Result<Page, PageError> {
    let num_pages = self.num_pages();
    let number = match raw.map(str::trim) {
      None | Some("") => 1,
      Some("last") => num_pages,
      Some(s) => {
        let n: i64 = s.parse().map_err(|_| PageError::NotAnInteger)?;
        if n < 1 {
          return Err(PageError::LessThanOne);
        }
        n as u64
      }
    };
    if number > num_pages {
      return Err(PageError::Empty);
    }
    Ok(Page {
      number,
      num_pages,
      offset: ((number - 1) as usize) * self.per_page,
      limit: self.per_page,
    })
  }
}

/// Query string of the listing pages
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
  pub year: Option<String>,
  pub month: Option<String>,
  pub page: Option<String>,
}

impl ListQuery {
  /// Parsed filter. Unparseable values (and months outside 1..=12) are ignored.
  pub fn filter(&self) -> EntryFilter {
    EntryFilter {
      year: self.year.as_deref().and_then(|y| y.trim().parse().ok()),
      month: self
        .month
        .as_deref()
        .and_then(|m| m.trim().parse().ok())
        .filter(|m| (1..=12).contains(m)),
    }
  }

  /// `year=..&month=..` exactly as received, for pagination links
  pub fn filter_params(&self) -> String {
    let mut params = Vec::new();
    if let Some(year) = self.year.as_deref().filter(|y| !y.is_empty()) {
      params.push(format!("year={}", urlencoding::encode(year)));
    }
    if let Some(month) = self.month.as_deref().filter(|m| !m.is_empty()) {
      params.push(format!("month={}", urlencoding::encode(month)));
    }
    params.join("&")
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearOption {
  pub year: i32,
  pub label: String,
  pub is_current: bool,
}

/// Years that have entries plus the current year, newest first
pub fn year_options(entry_years: &[i32], current_year: i32) -> Vec<YearOption> {
  let mut years: Vec<i32> = entry_years.to_vec();
  years.push(current_year);
  years.sort_unstable_by(|a, b| b.cmp(a));
  years.dedup();
  years
    .into_iter()
    .map(|year| YearOption {
      year,
      label: if year == current_year {
        format!("{} (Año actual)", year)
      } else {
        year.to_string()
      },
      is_current: year == current_year,
    })
    .collect()
}
