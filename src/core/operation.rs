//! Typed lifecycle operations and the operator context that performs them.
//!
//! Every state-changing request is an [`Operation`]: one variant per operation kind,
//! each carrying exactly the payload that kind needs. Payload pieces are validated
//! when they are constructed, so the ledger never sees a requisition without a
//! target employee or a borrow whose period ends before it starts.

use crate::{
    entities::{OperationKind, ReturnType},
    errors::{Error, Result},
};
use chrono::{DateTime, TimeDelta, Utc};

/// Who is performing an operation. Stamped onto every flow record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Display name written to the flow record
    pub name: String,
    /// Stable id of the operator, when one exists
    pub id: Option<String>,
}

impl Operator {
    /// Creates an operator with a display name and optional stable id.
    pub fn new(name: impl Into<String>, id: Option<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::MissingField { field: "operator" });
        }
        Ok(Self { name, id })
    }

    /// Operator used for writes that are not attributable to a person.
    #[must_use]
    pub fn system() -> Self {
        Self {
            name: "System".to_string(),
            id: None,
        }
    }
}

/// Identity of an employee who holds (or returns) an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holder {
    /// Employee name
    pub employee_name: String,
    /// Employee code
    pub employee_code: Option<String>,
    /// Department name
    pub department_name: Option<String>,
}

impl Holder {
    /// Creates a holder; the employee name is required.
    pub fn new(
        employee_name: impl Into<String>,
        employee_code: Option<String>,
        department_name: Option<String>,
    ) -> Result<Self> {
        let employee_name = employee_name.into().trim().to_string();
        if employee_name.is_empty() {
            return Err(Error::MissingField {
                field: "target_employee_name",
            });
        }
        Ok(Self {
            employee_name,
            employee_code: non_empty(employee_code),
            department_name: non_empty(department_name),
        })
    }
}

/// Physical location of an asset: floor, room type and specific spot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Floor (e.g., "3F")
    pub floor: String,
    /// Room type (e.g., "Office")
    pub room_type: String,
    /// Specific location inside the room (e.g., "Desk 12")
    pub specific_location: String,
}

impl Location {
    /// Creates a location; all three parts are required.
    pub fn new(
        floor: impl Into<String>,
        room_type: impl Into<String>,
        specific_location: impl Into<String>,
    ) -> Result<Self> {
        let floor = floor.into().trim().to_string();
        let room_type = room_type.into().trim().to_string();
        let specific_location = specific_location.into().trim().to_string();
        if floor.is_empty() {
            return Err(Error::MissingField {
                field: "target_floor",
            });
        }
        if room_type.is_empty() {
            return Err(Error::MissingField {
                field: "target_room_type",
            });
        }
        if specific_location.is_empty() {
            return Err(Error::MissingField {
                field: "target_specific_location",
            });
        }
        Ok(Self {
            floor,
            room_type,
            specific_location,
        })
    }

    /// Single-line rendering, e.g. "3F Office Desk 12".
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {} {}", self.floor, self.room_type, self.specific_location)
    }
}

/// Target of a requisition, borrow or transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Employee who will hold the asset
    pub holder: Holder,
    /// Where the asset will be, if known
    pub location: Option<Location>,
    /// External form number linking the records of one request
    pub related_form_no: Option<String>,
}

impl Assignment {
    /// Creates an assignment to a holder, optionally at a location.
    #[must_use]
    pub const fn new(holder: Holder, location: Option<Location>) -> Self {
        Self {
            holder,
            location,
            related_form_no: None,
        }
    }

    /// Attaches an external form number.
    #[must_use]
    pub fn with_form_no(mut self, form_no: Option<String>) -> Self {
        self.related_form_no = non_empty(form_no);
        self
    }
}

/// Borrow period; the end is strictly after the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BorrowPeriod {
    /// Creates a borrow period, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(Error::InvalidPayload {
                message: format!("borrow period ends ({end}) before it starts ({start})"),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates a period of `days` whole days starting at `start`.
    pub fn for_days(start: DateTime<Utc>, days: u32) -> Result<Self> {
        let end = TimeDelta::try_days(i64::from(days))
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(|| Error::InvalidPayload {
                message: format!("a borrow of {days} days is out of range"),
            })?;
        Self::new(start, end)
    }

    /// Period start
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Period end
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Payload of a return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnDetails {
    /// Normal or resignation-driven return
    pub return_type: ReturnType,
    /// Who brought the assets back; derived from the current holders when absent
    pub returned_by: Option<Holder>,
}

/// A lifecycle operation applied to a batch of existing assets.
///
/// `inbound` is not listed: it is only ever written by asset intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Issue in-stock assets to an employee
    Requisition(Assignment),
    /// Lend in-stock assets to an employee for a period
    Borrow(Assignment, BorrowPeriod),
    /// Bring in-use assets back into stock
    Return(ReturnDetails),
    /// Move in-use assets to a new holder
    Transfer(Assignment),
    /// Write assets off
    Scrap,
    /// Physically remove scrapped assets
    Dispose,
}

impl Operation {
    /// Kind recorded on the flow record
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Requisition(_) => OperationKind::Requisition,
            Self::Borrow(..) => OperationKind::Borrow,
            Self::Return(_) => OperationKind::Return,
            Self::Transfer(_) => OperationKind::Transfer,
            Self::Scrap => OperationKind::Scrap,
            Self::Dispose => OperationKind::Dispose,
        }
    }

    /// The new holder and location, for operations that assign one.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        match self {
            Self::Requisition(assignment)
            | Self::Borrow(assignment, _)
            | Self::Transfer(assignment) => Some(assignment),
            Self::Return(_) | Self::Scrap | Self::Dispose => None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_holder_requires_name() {
        let result = Holder::new("   ", None, None);
        assert!(matches!(
            result,
            Err(Error::MissingField {
                field: "target_employee_name"
            })
        ));
    }

    #[test]
    fn test_holder_trims_and_drops_blank_optionals() {
        let holder = Holder::new(" 张三 ", Some("  ".to_string()), Some("研发部".to_string())).unwrap();
        assert_eq!(holder.employee_name, "张三");
        assert_eq!(holder.employee_code, None);
        assert_eq!(holder.department_name.as_deref(), Some("研发部"));
    }

    #[test]
    fn test_location_requires_all_parts() {
        assert!(Location::new("3F", "", "Desk 1").is_err());
        let location = Location::new("3F", "Office", "Desk 1").unwrap();
        assert_eq!(location.display(), "3F Office Desk 1");
    }

    #[test]
    fn test_borrow_period_must_move_forward() {
        let now = Utc::now();
        assert!(BorrowPeriod::new(now, now).is_err());
        assert!(BorrowPeriod::new(now, now - TimeDelta::days(1)).is_err());

        let period = BorrowPeriod::new(now, now + TimeDelta::days(7)).unwrap();
        assert_eq!(period.start(), now);
        assert_eq!(period.end(), now + TimeDelta::days(7));
    }

    #[test]
    fn test_borrow_period_for_days() {
        let now = Utc::now();
        let period = BorrowPeriod::for_days(now, 14).unwrap();
        assert_eq!(period.end() - period.start(), TimeDelta::days(14));

        assert!(matches!(
            BorrowPeriod::for_days(now, 0),
            Err(Error::InvalidPayload { .. })
        ));
        assert!(matches!(
            BorrowPeriod::for_days(now, u32::MAX),
            Err(Error::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_operation_kind_and_assignment() {
        let holder = Holder::new("张三", None, None).unwrap();
        let requisition = Operation::Requisition(Assignment::new(holder, None));
        assert_eq!(requisition.kind(), OperationKind::Requisition);
        assert!(requisition.assignment().is_some());

        assert_eq!(Operation::Scrap.kind(), OperationKind::Scrap);
        assert!(Operation::Scrap.assignment().is_none());
        assert_eq!(
            Operation::Return(ReturnDetails::default()).kind(),
            OperationKind::Return
        );
    }

    #[test]
    fn test_operator_requires_name() {
        assert!(Operator::new("", None).is_err());
        let operator = Operator::new("王五", Some("1001".to_string())).unwrap();
        assert_eq!(operator.name, "王五");
        assert_eq!(Operator::system().name, "System");
    }

    #[test]
    fn test_assignment_form_no_blank_is_dropped() {
        let holder = Holder::new("张三", None, None).unwrap();
        let assignment = Assignment::new(holder, None).with_form_no(Some(" ".to_string()));
        assert!(assignment.related_form_no.is_none());
    }
}
