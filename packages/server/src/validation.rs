//! Request validation.
//!
//! Every check returns a [`ValidationError`] whose message is sent back to
//! the client verbatim with a 400 status.

use chrono::NaiveDate;
use solaris_export::ExportFormat;
use solaris_server_models::FetchDataRequest;
use solaris_variable_models::{BoundingBox, Dataset, DateRange, GeoPoint, Region, Variable};
use thiserror::Error;

/// Longest accepted date range, in days.
pub const MAX_SPAN_DAYS: i64 = 365;

/// Days covered when a request gives no start date.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Largest accepted projection horizon.
pub const MAX_YEARS: i64 = 100;

/// Variables fetched when a request names none.
pub const DEFAULT_VARIABLES: [Variable; 2] = [Variable::Lst, Variable::Ndvi];

/// A request that cannot be served.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Neither `coords` nor `bounds` was given.
    #[error("Provide coords or bounds")]
    MissingRegion,

    /// Latitude outside `[-90, 90]`.
    #[error("Invalid latitude {0}: must be between -90 and 90")]
    Latitude(f64),

    /// Longitude outside `[-180, 180]`.
    #[error("Invalid longitude {0}: must be between -180 and 180")]
    Longitude(f64),

    /// Inverted rectangle.
    #[error("Invalid bounds: north must be >= south and east must be >= west")]
    InvertedBounds,

    /// Date not in `YYYY-MM-DD` form.
    #[error("Invalid {field} '{value}': expected YYYY-MM-DD")]
    Date {
        /// Request field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Start after end.
    #[error("startDate must not be after endDate")]
    DateOrder,

    /// Range longer than [`MAX_SPAN_DAYS`].
    #[error("Date range spans {0} days; the maximum is 365")]
    DateSpan(i64),

    /// An explicitly empty variable list.
    #[error("At least one variable is required")]
    NoVariables,

    /// Unrecognized variable identifier.
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    /// No readings were submitted.
    #[error("Provide data")]
    MissingData,

    /// A submitted reading is unusable.
    #[error("Invalid {variable} reading: {reason}")]
    Reading {
        /// Series the reading belongs to.
        variable: Variable,
        /// What is wrong with it.
        reason: String,
    },

    /// Projection horizon outside `0..=100`.
    #[error("years must be between 0 and 100, got {0}")]
    Years(i64),

    /// Unknown export format.
    #[error("Unsupported format '{0}'. Use: csv, json or pdf")]
    Format(String),
}

/// Checks a coordinate pair.
///
/// # Errors
///
/// Returns [`ValidationError::Latitude`] or [`ValidationError::Longitude`].
pub fn coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::Latitude(lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ValidationError::Longitude(lng));
    }
    Ok(())
}

/// Checks a rectangle: valid corners, not inverted.
///
/// # Errors
///
/// Returns a coordinate error or [`ValidationError::InvertedBounds`].
pub fn bounds(bbox: &BoundingBox) -> Result<(), ValidationError> {
    coordinates(bbox.south, bbox.west)?;
    coordinates(bbox.north, bbox.east)?;
    if bbox.north < bbox.south || bbox.east < bbox.west {
        return Err(ValidationError::InvertedBounds);
    }
    Ok(())
}

/// Builds the region a fetch covers. `bounds` wins over `coords`.
///
/// # Errors
///
/// Returns [`ValidationError`] if neither is present or either is invalid.
pub fn region(request: &FetchDataRequest) -> Result<Region, ValidationError> {
    if let Some(bbox) = request.bounds {
        bounds(&bbox)?;
        return Ok(Region::Bounds(bbox));
    }

    let center: GeoPoint = request.coords.ok_or(ValidationError::MissingRegion)?;
    coordinates(center.lat, center.lng)?;
    Ok(Region::around(center, request.radius))
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`ValidationError::Date`] naming `field`.
pub fn date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::Date {
        field,
        value: value.to_string(),
    })
}

/// Resolves the request dates. A missing end is `today`; a missing start
/// is [`DEFAULT_WINDOW_DAYS`] before the end.
///
/// # Errors
///
/// Returns [`ValidationError`] for malformed, inverted or over-long ranges.
pub fn date_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, ValidationError> {
    let end = end.map_or(Ok(today), |value| date("endDate", value))?;
    let range = match start {
        Some(value) => DateRange::new(date("startDate", value)?, end),
        None => DateRange::trailing_days(end, DEFAULT_WINDOW_DAYS),
    };

    if range.start > range.end {
        return Err(ValidationError::DateOrder);
    }
    let span = range.span_days();
    if span > MAX_SPAN_DAYS {
        return Err(ValidationError::DateSpan(span));
    }
    Ok(range)
}

/// Parses the requested variables, dropping duplicates. `None` means
/// [`DEFAULT_VARIABLES`].
///
/// # Errors
///
/// Returns [`ValidationError::NoVariables`] for an empty list or
/// [`ValidationError::UnknownVariable`] for an unrecognized identifier.
pub fn variables(requested: Option<&[String]>) -> Result<Vec<Variable>, ValidationError> {
    let Some(requested) = requested else {
        return Ok(DEFAULT_VARIABLES.to_vec());
    };
    if requested.is_empty() {
        return Err(ValidationError::NoVariables);
    }

    let mut parsed = Vec::with_capacity(requested.len());
    for identifier in requested {
        let variable = Variable::parse(identifier)
            .map_err(|_| ValidationError::UnknownVariable(identifier.clone()))?;
        if !parsed.contains(&variable) {
            parsed.push(variable);
        }
    }
    Ok(parsed)
}

/// Checks submitted readings: at least one, all finite with valid
/// coordinates.
///
/// # Errors
///
/// Returns [`ValidationError::MissingData`] or [`ValidationError::Reading`].
pub fn dataset(dataset: &Dataset) -> Result<(), ValidationError> {
    if dataset.reading_count() == 0 {
        return Err(ValidationError::MissingData);
    }

    for (variable, series) in dataset.iter() {
        for reading in series {
            if !reading.value.is_finite() {
                return Err(ValidationError::Reading {
                    variable,
                    reason: "value is not a finite number".to_string(),
                });
            }
            coordinates(reading.latitude, reading.longitude).map_err(|e| {
                ValidationError::Reading {
                    variable,
                    reason: e.to_string(),
                }
            })?;
        }
    }
    Ok(())
}

/// Checks the projection horizon.
///
/// # Errors
///
/// Returns [`ValidationError::Years`] outside `0..=100`.
pub fn years(years: i64) -> Result<u32, ValidationError> {
    if !(0..=MAX_YEARS).contains(&years) {
        return Err(ValidationError::Years(years));
    }
    u32::try_from(years).map_err(|_| ValidationError::Years(years))
}

/// Parses the export format; `None` means CSV.
///
/// # Errors
///
/// Returns [`ValidationError::Format`] for anything but csv, json or pdf.
pub fn export_format(format: Option<&str>) -> Result<ExportFormat, ValidationError> {
    format.map_or(Ok(ExportFormat::default()), |value| {
        value
            .trim()
            .parse()
            .map_err(|_| ValidationError::Format(value.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solaris_variable_models::VariableReading;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn coordinate_ranges_are_inclusive() {
        assert!(coordinates(90.0, 180.0).is_ok());
        assert!(coordinates(-90.0, -180.0).is_ok());
        assert_eq!(coordinates(90.5, 0.0), Err(ValidationError::Latitude(90.5)));
        assert_eq!(coordinates(0.0, -181.0), Err(ValidationError::Longitude(-181.0)));
    }

    #[test]
    fn bounds_must_not_be_inverted() {
        assert!(bounds(&BoundingBox::new(-46.8, -23.7, -46.4, -23.4)).is_ok());
        assert_eq!(
            bounds(&BoundingBox::new(-46.4, -23.7, -46.8, -23.4)),
            Err(ValidationError::InvertedBounds)
        );
        assert_eq!(
            bounds(&BoundingBox::new(-46.8, -95.0, -46.4, -23.4)),
            Err(ValidationError::Latitude(-95.0))
        );
    }

    #[test]
    fn region_prefers_bounds_and_requires_one() {
        let bbox = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
        let request = FetchDataRequest {
            coords: Some(GeoPoint::new(0.0, 0.0)),
            bounds: Some(bbox),
            ..FetchDataRequest::default()
        };
        assert_eq!(region(&request), Ok(Region::Bounds(bbox)));

        assert_eq!(
            region(&FetchDataRequest::default()),
            Err(ValidationError::MissingRegion)
        );

        let request = FetchDataRequest {
            coords: Some(GeoPoint::new(10.0, 10.0)),
            radius: Some(80_000.0),
            ..FetchDataRequest::default()
        };
        assert!(matches!(
            region(&request),
            Ok(Region::Circle { radius_m, .. }) if (radius_m - 50_000.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn dates_default_to_trailing_window() {
        let today = day(2024, 7, 31);
        let range = date_range(None, None, today).unwrap();

        assert_eq!(range.end, today);
        assert_eq!(range.start, day(2024, 7, 1));
    }

    #[test]
    fn date_rules() {
        let today = day(2024, 7, 31);

        assert!(date_range(Some("2024-01-01"), Some("2024-12-31"), today).is_ok());
        assert_eq!(
            date_range(Some("2024-02-01"), Some("2024-01-01"), today),
            Err(ValidationError::DateOrder)
        );
        assert_eq!(
            date_range(Some("2023-01-01"), Some("2024-01-02"), today),
            Err(ValidationError::DateSpan(366))
        );
        assert_eq!(
            date_range(Some("01/02/2024"), None, today),
            Err(ValidationError::Date {
                field: "startDate",
                value: "01/02/2024".to_string()
            })
        );
    }

    #[test]
    fn variables_default_dedupe_and_reject_unknown() {
        assert_eq!(variables(None).unwrap(), DEFAULT_VARIABLES.to_vec());
        assert_eq!(variables(Some(&[][..])), Err(ValidationError::NoVariables));

        let requested = ["ndvi".to_string(), "NDVI".to_string(), "popDens".to_string()];
        assert_eq!(
            variables(Some(requested.as_slice())).unwrap(),
            vec![Variable::Ndvi, Variable::PopDens]
        );

        let requested = ["albedo".to_string()];
        assert_eq!(
            variables(Some(requested.as_slice())),
            Err(ValidationError::UnknownVariable("albedo".to_string()))
        );
    }

    #[test]
    fn dataset_requires_valid_readings() {
        assert_eq!(dataset(&Dataset::new()), Err(ValidationError::MissingData));

        let mut data = Dataset::new();
        data.insert(Variable::Lst, vec![VariableReading::new(10.0, 10.0, 30.0)]);
        assert!(dataset(&data).is_ok());

        data.insert(Variable::Ndvi, vec![VariableReading::new(100.0, 10.0, 0.3)]);
        assert!(matches!(
            dataset(&data),
            Err(ValidationError::Reading {
                variable: Variable::Ndvi,
                ..
            })
        ));

        data.insert(Variable::Ndvi, vec![VariableReading::new(10.0, 10.0, f64::NAN)]);
        assert!(dataset(&data).is_err());
    }

    #[test]
    fn years_and_formats() {
        assert_eq!(years(0), Ok(0));
        assert_eq!(years(100), Ok(100));
        assert_eq!(years(-1), Err(ValidationError::Years(-1)));
        assert_eq!(years(101), Err(ValidationError::Years(101)));

        assert_eq!(export_format(None), Ok(ExportFormat::Csv));
        assert_eq!(export_format(Some("PDF")), Ok(ExportFormat::Pdf));
        assert_eq!(
            export_format(Some("xlsx")),
            Err(ValidationError::Format("xlsx".to_string()))
        );
    }
}
