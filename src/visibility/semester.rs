//! Observing semesters and date ranges.
//!
//! The survey uses two semesters per calendar year: A runs Feb 1 through
//! Jul 31, B runs Aug 1 through Jan 31 of the following year. When an upload
//! does not name an observing window, visibility is computed over the next
//! semester after the upload date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Half-open civil date range `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemesterTerm {
    A,
    B,
}

impl SemesterTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemesterTerm::A => "A",
            SemesterTerm::B => "B",
        }
    }
}

/// One observing semester, e.g. `2026A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub year: i32,
    pub term: SemesterTerm,
}

impl Semester {
    /// The next semester that starts strictly after the given date.
    pub fn next_after(date: NaiveDate) -> Semester {
        match date.month() {
            1 => Semester {
                year: date.year(),
                term: SemesterTerm::A,
            },
            2..=7 => Semester {
                year: date.year(),
                term: SemesterTerm::B,
            },
            _ => Semester {
                year: date.year() + 1,
                term: SemesterTerm::A,
            },
        }
    }

    /// Civil dates covered by this semester, end exclusive.
    pub fn date_range(&self) -> DateRange {
        match self.term {
            SemesterTerm::A => DateRange {
                begin: first_of(self.year, 2),
                end: first_of(self.year, 8),
            },
            SemesterTerm::B => DateRange {
                begin: first_of(self.year, 8),
                end: first_of(self.year + 1, 2),
            },
        }
    }
}

impl std::fmt::Display for Semester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.year, self.term.as_str())
    }
}

fn first_of(year: i32, month: u32) -> NaiveDate {
    // Month is one of the fixed semester boundaries, never out of range.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_january_maps_to_semester_a_same_year() {
        let s = Semester::next_after(date(2026, 1, 15));
        assert_eq!(s.year, 2026);
        assert_eq!(s.term, SemesterTerm::A);
    }

    #[test]
    fn test_spring_maps_to_semester_b_same_year() {
        for month in 2..=7 {
            let s = Semester::next_after(date(2026, month, 10));
            assert_eq!(s.year, 2026);
            assert_eq!(s.term, SemesterTerm::B);
        }
    }

    #[test]
    fn test_autumn_maps_to_semester_a_next_year() {
        for month in 8..=12 {
            let s = Semester::next_after(date(2026, month, 10));
            assert_eq!(s.year, 2027);
            assert_eq!(s.term, SemesterTerm::A);
        }
    }

    #[test]
    fn test_semester_date_ranges() {
        let a = Semester {
            year: 2026,
            term: SemesterTerm::A,
        };
        assert_eq!(
            a.date_range(),
            DateRange {
                begin: date(2026, 2, 1),
                end: date(2026, 8, 1),
            }
        );

        let b = Semester {
            year: 2026,
            term: SemesterTerm::B,
        };
        assert_eq!(
            b.date_range(),
            DateRange {
                begin: date(2026, 8, 1),
                end: date(2027, 2, 1),
            }
        );
    }

    #[test]
    fn test_display() {
        let s = Semester {
            year: 2026,
            term: SemesterTerm::B,
        };
        assert_eq!(s.to_string(), "2026B");
    }
}
