//! List query engine: filter, sort, and paginate job collections.
//!
//! Both persistence paths produce the same response shape from the same
//! rules. The local adapter runs [`run`] over its full in-memory
//! collection; the remote reference backend runs the identical function
//! over its own rows, so the two modes cannot drift on ordering or
//! counts for equivalent data.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

use crate::model::Job;

/// Default page size when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 50;
/// Hard server-side cap on page size.
pub const MAX_LIMIT: u32 = 100;
/// Page size used by the paginated listing UI.
pub const PAGE_SIZE: u32 = 12;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort order for job listings. Each key is a (primary, tiebreak) pair
/// evaluated as a total order; `id` breaks any remaining ties so the
/// ordering is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Newest effective date first. The default.
    #[default]
    DateDesc,
    /// Oldest effective date first.
    DateAsc,
    /// Company A-Z, then newest created.
    CompanyAsc,
    /// Company Z-A, then newest created.
    CompanyDesc,
    /// Status A-Z, then newest created.
    StatusAsc,
    /// Status Z-A, then newest created.
    StatusDesc,
}

impl SortBy {
    /// Parse a wire value, falling back to the default for anything
    /// unknown (the server never rejects a sort parameter).
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::from_str(v).ok())
            .unwrap_or_default()
    }

    fn compare(self, a: &Job, b: &Job) -> Ordering {
        let primary = match self {
            Self::DateDesc => b
                .effective_date()
                .cmp(&a.effective_date())
                .then_with(|| b.created_at.cmp(&a.created_at)),
            Self::DateAsc => a
                .effective_date()
                .cmp(&b.effective_date())
                .then_with(|| a.created_at.cmp(&b.created_at)),
            Self::CompanyAsc => a
                .company
                .cmp(&b.company)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            Self::CompanyDesc => b
                .company
                .cmp(&a.company)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            Self::StatusAsc => a
                .status
                .as_str()
                .cmp(b.status.as_str())
                .then_with(|| b.created_at.cmp(&a.created_at)),
            Self::StatusDesc => b
                .status
                .as_str()
                .cmp(a.status.as_str())
                .then_with(|| b.created_at.cmp(&a.created_at)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateDesc => f.write_str("date_desc"),
            Self::DateAsc => f.write_str("date_asc"),
            Self::CompanyAsc => f.write_str("company_asc"),
            Self::CompanyDesc => f.write_str("company_desc"),
            Self::StatusAsc => f.write_str("status_asc"),
            Self::StatusDesc => f.write_str("status_desc"),
        }
    }
}

impl FromStr for SortBy {
    type Err = UnknownSortBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date_desc" => Ok(Self::DateDesc),
            "date_asc" => Ok(Self::DateAsc),
            "company_asc" => Ok(Self::CompanyAsc),
            "company_desc" => Ok(Self::CompanyDesc),
            "status_asc" => Ok(Self::StatusAsc),
            "status_desc" => Ok(Self::StatusDesc),
            _ => Err(UnknownSortBy(s.to_string())),
        }
    }
}

/// Error returned when parsing a sort key from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortBy(pub String);

impl fmt::Display for UnknownSortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort order '{}'", self.0)
    }
}

impl std::error::Error for UnknownSortBy {}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter, sort, and pagination parameters for a job listing.
///
/// Filters are optional and AND-combined, applied in declaration order:
/// text, status, date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Case-insensitive substring match against company OR position.
    pub query: Option<String>,
    /// Exact status match; `"all"` (or empty) disables the filter.
    pub status: Option<String>,
    /// Inclusive lower bound on the effective date.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound, extended through the end of that
    /// calendar day.
    pub to_date: Option<NaiveDate>,
    pub sort_by: SortBy,
    /// `None` means [`DEFAULT_LIMIT`]; always clamped to
    /// `1..=MAX_LIMIT`.
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ListQuery {
    #[must_use]
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// The status filter with the `"all"` sentinel resolved away.
    #[must_use]
    pub fn status_filter(&self) -> Option<&str> {
        match self.status.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some(status) => Some(status),
        }
    }
}

/// One page of results plus the metadata needed to paginate further.
/// Identical shape from both persistence paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub items: Vec<Job>,
    /// Filtered (pre-slice) count.
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: SortBy,
    pub has_more: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// End of calendar day `d` in UTC: `d + 24h - 1ms`.
fn day_end(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(0, 0, 0)
        .map_or_else(Utc::now, |midnight| {
            midnight.and_utc() + Duration::days(1) - Duration::milliseconds(1)
        })
}

/// Whether a job passes every filter in `query`.
#[must_use]
pub fn matches(job: &Job, query: &ListQuery) -> bool {
    if let Some(text) = query.query.as_deref().map(str::trim)
        && !text.is_empty()
    {
        let needle = text.to_lowercase();
        let hit = job.company.to_lowercase().contains(&needle)
            || job.position.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }

    if let Some(status) = query.status_filter()
        && job.status.as_str() != status
    {
        return false;
    }

    let effective = job.effective_date();
    if let Some(from) = query.from_date
        && let Some(start) = from.and_hms_opt(0, 0, 0).map(|t| t.and_utc())
        && effective < start
    {
        return false;
    }
    if let Some(to) = query.to_date
        && effective > day_end(to)
    {
        return false;
    }

    true
}

/// Sort jobs in place by the given key.
pub fn sort_jobs(jobs: &mut [Job], sort_by: SortBy) {
    jobs.sort_by(|a, b| sort_by.compare(a, b));
}

/// Filter, sort, and slice a full collection into one page.
///
/// `total` is the filtered count before slicing, so `has_more` reports
/// whether another page exists past this one.
#[must_use]
pub fn run(jobs: &[Job], query: &ListQuery) -> JobPage {
    let mut filtered: Vec<Job> = jobs
        .iter()
        .filter(|job| matches(job, query))
        .cloned()
        .collect();
    sort_jobs(&mut filtered, query.sort_by);

    let total = u64::try_from(filtered.len()).unwrap_or(u64::MAX);
    let limit = query.effective_limit();
    let offset = query.offset;

    let start = usize::try_from(offset)
        .unwrap_or(usize::MAX)
        .min(filtered.len());
    let end = start
        .saturating_add(usize::try_from(limit).unwrap_or(usize::MAX))
        .min(filtered.len());
    let items: Vec<Job> = filtered[start..end].to_vec();

    let returned = u64::try_from(items.len()).unwrap_or(u64::MAX);
    let has_more = u64::from(offset) + returned < total;

    JobPage {
        items,
        total,
        limit,
        offset,
        sort_by: query.sort_by,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Job, Status};
    use chrono::TimeZone;

    fn job(id: i64, company: &str, status: Status, created: DateTime<Utc>) -> Job {
        Job {
            id,
            company: company.to_string(),
            position: "Engineer".to_string(),
            status,
            description: None,
            job_url: None,
            apply_date: None,
            created_at: created,
            notes: vec![],
        }
    }

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sample() -> Vec<Job> {
        vec![
            job(1, "Acme", Status::Applied, ts(2026, 1, 10, 9)),
            job(2, "Globex", Status::Interview, ts(2026, 1, 12, 9)),
            job(3, "Zenith", Status::Offer, ts(2026, 1, 11, 9)),
        ]
    }

    #[test]
    fn text_filter_is_case_insensitive_over_company_and_position() {
        let mut jobs = sample();
        jobs[2].position = "Staff Acrobat".to_string();

        let q = ListQuery {
            query: Some("aCmE".to_string()),
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].company, "Acme");

        let q = ListQuery {
            query: Some("acrobat".to_string()),
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].company, "Zenith");
    }

    #[test]
    fn status_filter_with_all_sentinel_disabled() {
        let jobs = sample();

        let q = ListQuery {
            status: Some("interview".to_string()),
            ..Default::default()
        };
        assert_eq!(run(&jobs, &q).total, 1);

        let q = ListQuery {
            status: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(run(&jobs, &q).total, 3);
    }

    #[test]
    fn to_date_is_inclusive_through_end_of_day() {
        let boundary = NaiveDate::from_ymd_opt(2026, 1, 11).unwrap();
        let last_ms = Utc
            .with_ymd_and_hms(2026, 1, 11, 23, 59, 59)
            .unwrap()
            + Duration::milliseconds(999);
        let next_ms = Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap();

        let jobs = vec![
            job(1, "Inside", Status::Applied, last_ms),
            job(2, "Outside", Status::Applied, next_ms),
        ];

        let q = ListQuery {
            to_date: Some(boundary),
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].company, "Inside");
    }

    #[test]
    fn from_date_is_inclusive_from_start_of_day() {
        let jobs = vec![
            job(1, "Before", Status::Applied, ts(2026, 1, 10, 23)),
            job(2, "OnDay", Status::Applied, ts(2026, 1, 11, 0)),
        ];

        let q = ListQuery {
            from_date: NaiveDate::from_ymd_opt(2026, 1, 11),
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].company, "OnDay");
    }

    #[test]
    fn date_filter_uses_apply_date_when_present() {
        let mut jobs = sample();
        // Created in January, applied in February.
        jobs[0].apply_date = Some(ts(2026, 2, 20, 12));

        let q = ListQuery {
            from_date: NaiveDate::from_ymd_opt(2026, 2, 1),
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].company, "Acme");
    }

    #[test]
    fn company_desc_orders_z_to_a() {
        let page = run(
            &sample(),
            &ListQuery {
                sort_by: SortBy::CompanyDesc,
                ..Default::default()
            },
        );
        let companies: Vec<&str> = page.items.iter().map(|j| j.company.as_str()).collect();
        assert_eq!(companies, ["Zenith", "Globex", "Acme"]);
    }

    #[test]
    fn date_desc_is_default_and_falls_back_to_created_at() {
        let page = run(&sample(), &ListQuery::default());
        let ids: Vec<i64> = page.items.iter().map(|j| j.id).collect();
        assert_eq!(ids, [2, 3, 1]);
        assert_eq!(page.sort_by, SortBy::DateDesc);
    }

    #[test]
    fn date_sort_prefers_apply_date() {
        let mut jobs = sample();
        // Oldest created, but most recently applied.
        jobs[0].apply_date = Some(ts(2026, 2, 1, 9));

        let page = run(
            &jobs,
            &ListQuery {
                sort_by: SortBy::DateDesc,
                ..Default::default()
            },
        );
        assert_eq!(page.items[0].company, "Acme");
    }

    #[test]
    fn equal_keys_tie_break_on_id() {
        let same = ts(2026, 1, 10, 9);
        let jobs = vec![
            job(30, "Same", Status::Applied, same),
            job(10, "Same", Status::Applied, same),
            job(20, "Same", Status::Applied, same),
        ];

        for sort_by in [
            SortBy::DateDesc,
            SortBy::DateAsc,
            SortBy::CompanyAsc,
            SortBy::StatusDesc,
        ] {
            let page = run(
                &jobs,
                &ListQuery {
                    sort_by,
                    ..Default::default()
                },
            );
            let ids: Vec<i64> = page.items.iter().map(|j| j.id).collect();
            assert_eq!(ids, [10, 20, 30], "tie-break failed for {sort_by}");
        }
    }

    #[test]
    fn pagination_slices_and_reports_has_more() {
        let jobs: Vec<Job> = (1..=5)
            .map(|i| job(i, "Acme", Status::Applied, ts(2026, 1, u32::try_from(i).unwrap(), 9)))
            .collect();

        let q = ListQuery {
            sort_by: SortBy::DateAsc,
            limit: Some(2),
            offset: 0,
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert!(page.has_more);

        let q = ListQuery {
            sort_by: SortBy::DateAsc,
            limit: Some(2),
            offset: 4,
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more);

        let q = ListQuery {
            limit: Some(2),
            offset: 100,
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert!(!page.has_more);
    }

    #[test]
    fn limit_is_clamped_to_server_cap() {
        let q = ListQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(q.effective_limit(), MAX_LIMIT);

        let q = ListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(q.effective_limit(), 1);

        assert_eq!(ListQuery::default().effective_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn sort_by_parse_roundtrip_and_fallback() {
        for sort_by in [
            SortBy::DateDesc,
            SortBy::DateAsc,
            SortBy::CompanyAsc,
            SortBy::CompanyDesc,
            SortBy::StatusAsc,
            SortBy::StatusDesc,
        ] {
            let parsed: SortBy = sort_by.to_string().parse().unwrap();
            assert_eq!(parsed, sort_by);
        }

        assert_eq!(SortBy::parse_or_default(None), SortBy::DateDesc);
        assert_eq!(SortBy::parse_or_default(Some("bogus")), SortBy::DateDesc);
        assert_eq!(
            SortBy::parse_or_default(Some("company_desc")),
            SortBy::CompanyDesc
        );
    }

    #[test]
    fn combined_filters_are_anded() {
        let mut jobs = sample();
        jobs.push(job(4, "Acme", Status::Interview, ts(2026, 1, 20, 9)));

        let q = ListQuery {
            query: Some("acme".to_string()),
            status: Some("interview".to_string()),
            from_date: NaiveDate::from_ymd_opt(2026, 1, 15),
            ..Default::default()
        };
        let page = run(&jobs, &q);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, 4);
    }

    // ---- Properties ----

    use proptest::prelude::*;

    fn arb_jobs() -> impl Strategy<Value = Vec<Job>> {
        const NAMES: [&str; 4] = ["Acme", "Globex", "Zenith", "Initech"];
        let row = (
            0..NAMES.len(),
            0..Status::ALL.len(),
            0i64..5_000,
            proptest::option::of(0i64..90),
        );
        proptest::collection::vec(row, 0..25).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (name, status, minutes, apply_days))| {
                    let mut j = job(
                        i64::try_from(i).unwrap_or(i64::MAX) + 1,
                        NAMES[name],
                        Status::ALL[status],
                        ts(2026, 1, 1, 0) + Duration::minutes(minutes),
                    );
                    j.apply_date = apply_days.map(|d| ts(2026, 1, 1, 0) - Duration::days(d));
                    j
                })
                .collect()
        })
    }

    fn arb_query() -> impl Strategy<Value = ListQuery> {
        let status = proptest::option::of(prop_oneof![
            Just("all".to_string()),
            Just("applied".to_string()),
            Just("offer".to_string()),
        ]);
        let sort_by = prop_oneof![
            Just(SortBy::DateDesc),
            Just(SortBy::DateAsc),
            Just(SortBy::CompanyAsc),
            Just(SortBy::CompanyDesc),
            Just(SortBy::StatusAsc),
            Just(SortBy::StatusDesc),
        ];
        (status, sort_by, proptest::option::of(0u32..150), 0u32..40).prop_map(
            |(status, sort_by, limit, offset)| ListQuery {
                status,
                sort_by,
                limit,
                offset,
                ..Default::default()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn page_invariants_hold_for_any_query(jobs in arb_jobs(), q in arb_query()) {
            let page = run(&jobs, &q);

            let limit = q.effective_limit();
            prop_assert_eq!(page.limit, limit);
            prop_assert!(page.items.len() <= usize::try_from(limit).unwrap());

            let filtered = jobs.iter().filter(|j| matches(j, &q)).count();
            prop_assert_eq!(page.total, u64::try_from(filtered).unwrap());

            let shown = u64::from(page.offset)
                + u64::try_from(page.items.len()).unwrap();
            prop_assert_eq!(page.has_more, shown < page.total);

            prop_assert!(page.items.iter().all(|item| matches(item, &q)));
        }

        #[test]
        fn every_page_is_a_slice_of_the_full_ordering(jobs in arb_jobs(), q in arb_query()) {
            // Collections stay under MAX_LIMIT, so one unpaginated run
            // yields the complete ordering.
            let full = run(
                &jobs,
                &ListQuery {
                    limit: Some(MAX_LIMIT),
                    offset: 0,
                    ..q.clone()
                },
            );
            let page = run(&jobs, &q);

            let start = usize::try_from(q.offset).unwrap().min(full.items.len());
            let end = (start + page.items.len()).min(full.items.len());
            prop_assert_eq!(&page.items[..], &full.items[start..end]);
            prop_assert_eq!(page.total, full.total);
        }
    }
}
