//! Employment history parsing and gap detection

use chrono::{Datelike, Local, NaiveDate};
use log::{debug, warn};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gaps strictly longer than this many months are reported.
pub const DEFAULT_GAP_THRESHOLD_MONTHS: u32 = 6;

/// End-date label for a role that is still held.
pub const PRESENT: &str = "Present";

/// Resume section headings. Collapsed text puts them right before the first role,
/// so a captured title is cut after the last one it contains.
const SECTION_HEADINGS: &[&str] = &[
    "experience", "employment", "history", "skills", "summary", "profile", "objective", "education",
    "projects", "certifications",
];

const MAX_TITLE_WORDS: usize = 4;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar month, ignoring day-of-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Whole calendar months from `self` to `later` (negative when `later` is earlier).
    pub fn months_until(&self, later: &YearMonth) -> i64 {
        i64::from(later.year - self.year) * 12 + i64::from(later.month) - i64::from(self.month)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One role/employer/date-range occurrence as written in the resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEntry {
    pub job: String,
    pub start_date: String,
    pub end_date: String,
}

impl JobEntry {
    pub fn describe(&self) -> String {
        format!("{} ({} - {})", self.job, self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentGap {
    pub gap_start: String,
    pub gap_end: String,
    pub duration_months: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentHistory {
    pub experience: Vec<String>,
    pub employment_gaps: Vec<EmploymentGap>,
}

#[derive(Debug, Clone)]
struct DatedEntry {
    entry: JobEntry,
    start: YearMonth,
    end: YearMonth,
}

/// Parses job entries out of free text and reports gaps between them.
///
/// `Present` end dates resolve against the reference date, which defaults to
/// today at analysis time. Results therefore depend on when they are computed.
pub struct GapAnalyzer {
    entry_regex: Regex,
    reference_date: Option<NaiveDate>,
    threshold_months: u32,
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl GapAnalyzer {
    pub fn new() -> Self {
        // Titles start at a word that follows whitespace or a list separator.
        // <title> (@|at) <employer> (<month?> <year> - <month?> <year>|Present)
        let entry_regex = Regex::new(concat!(
            r"(?:^|[\s|;,\x{2022}])",
            r"(?P<title>[A-Za-z][\w&/.'+#-]*(?: [A-Za-z][\w&/.'+#-]*){0,4})",
            r"\s+(?:@|at)\s+",
            r"(?P<employer>[A-Za-z0-9][\w&/.,'+ -]*?)\s*",
            r"\(\s*(?:(?P<start_month>[A-Za-z]{3,9})\.?\s+)?(?P<start_year>\d{4})",
            r"\s*(?:-|\x{2013}|\x{2014}|(?i:to))\s*",
            r"(?:(?:(?P<end_month>[A-Za-z]{3,9})\.?\s+)?(?P<end_year>\d{4})|(?P<present>(?i:present|current|now)))",
            r"\s*\)",
        ))
        .expect("Invalid job entry regex");

        Self {
            entry_regex,
            reference_date: None,
            threshold_months: DEFAULT_GAP_THRESHOLD_MONTHS,
        }
    }

    /// Pins the date that `Present` resolves to.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_threshold(mut self, months: u32) -> Self {
        self.threshold_months = months;
        self
    }

    /// All job entries in the order they appear, dates as written (with month defaults applied).
    pub fn parse_entries(&self, text: &str) -> Vec<JobEntry> {
        self.entry_regex
            .captures_iter(text)
            .map(|caps| Self::entry_from_captures(&caps))
            .collect()
    }

    pub fn analyze(&self, text: &str) -> EmploymentHistory {
        let reference = YearMonth::from(self.reference_date.unwrap_or_else(|| Local::now().date_naive()));

        let mut dated: Vec<DatedEntry> = self
            .entry_regex
            .captures_iter(text)
            .filter_map(|caps| Self::dated_entry(&caps, reference))
            .collect();

        // Stable: entries sharing a start month keep their textual order.
        dated.sort_by_key(|d| d.start);

        let employment_gaps = dated
            .windows(2)
            .filter_map(|pair| {
                let (previous, next) = (&pair[0], &pair[1]);
                let months = previous.end.months_until(&next.start);
                if months > i64::from(self.threshold_months) {
                    Some(EmploymentGap {
                        gap_start: previous.end.to_string(),
                        gap_end: next.start.to_string(),
                        duration_months: months as u32,
                    })
                } else {
                    None
                }
            })
            .collect();

        let experience = dated.iter().map(|d| d.entry.describe()).collect();

        EmploymentHistory {
            experience,
            employment_gaps,
        }
    }

    fn entry_from_captures(caps: &Captures) -> JobEntry {
        let text = |name: &str| caps.name(name).map(|m| m.as_str().trim()).unwrap_or("");

        let start_month = caps.name("start_month").map(|m| m.as_str()).unwrap_or("Jan");
        let start_date = format!("{} {}", Self::month_label(start_month), text("start_year"));

        let end_date = if caps.name("present").is_some() {
            PRESENT.to_string()
        } else {
            let end_month = caps.name("end_month").map(|m| m.as_str()).unwrap_or("Dec");
            format!("{} {}", Self::month_label(end_month), text("end_year"))
        };

        JobEntry {
            job: format!("{} at {}", Self::trim_title(text("title")), text("employer")),
            start_date,
            end_date,
        }
    }

    fn dated_entry(caps: &Captures, reference: YearMonth) -> Option<DatedEntry> {
        let entry = Self::entry_from_captures(caps);

        let group = |name: &str| caps.name(name).map(|m| m.as_str());

        let start = match Self::parse_year_month(group("start_month"), group("start_year"), 1) {
            Some(start) => start,
            None => {
                warn!("Skipping job entry with unparseable start date: {}", &caps[0]);
                return None;
            }
        };

        let end = if caps.name("present").is_some() {
            reference
        } else {
            match Self::parse_year_month(group("end_month"), group("end_year"), 12) {
                Some(end) => end,
                None => {
                    warn!("Skipping job entry with unparseable end date: {}", &caps[0]);
                    return None;
                }
            }
        };

        if end < start {
            debug!("Job entry ends before it starts: {}", &caps[0]);
        }

        Some(DatedEntry { entry, start, end })
    }

    fn parse_year_month(month: Option<&str>, year: Option<&str>, default_month: u32) -> Option<YearMonth> {
        let year: i32 = year?.parse().ok()?;
        let month = match month {
            Some(name) => month_number(name)?,
            None => default_month,
        };
        YearMonth::new(year, month)
    }

    /// Drops words that belong to whatever precedes the role: anything up to the
    /// last section heading, then all but the final few words.
    fn trim_title(title: &str) -> String {
        let words: Vec<&str> = title.split(' ').filter(|w| !w.is_empty()).collect();

        let after_heading = words
            .iter()
            .rposition(|w| SECTION_HEADINGS.contains(&w.to_ascii_lowercase().as_str()))
            .map(|i| &words[i + 1..])
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&words[..]);

        let start = after_heading.len().saturating_sub(MAX_TITLE_WORDS);
        after_heading[start..].join(" ")
    }

    /// Canonical three-letter label, or the text as written when it is not a month.
    fn month_label(name: &str) -> String {
        month_number(name)
            .map(|m| MONTH_ABBREVIATIONS[(m - 1) as usize].to_string())
            .unwrap_or_else(|| name.to_string())
    }
}

/// Month number for full or abbreviated English month names.
pub fn month_number(name: &str) -> Option<u32> {
    let month = match name.trim_end_matches('.').to_ascii_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> GapAnalyzer {
        GapAnalyzer::new().with_reference_date(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap())
    }

    #[test]
    fn test_flags_gap_over_threshold() {
        let text = "Engineer at Acme (Jan 2018 - Dec 2019) Manager at Beta (Jul 2020 - Present)";
        let history = analyzer().analyze(text);

        assert_eq!(
            history.experience,
            vec![
                "Engineer at Acme (Jan 2018 - Dec 2019)".to_string(),
                "Manager at Beta (Jul 2020 - Present)".to_string(),
            ]
        );
        assert_eq!(
            history.employment_gaps,
            vec![EmploymentGap {
                gap_start: "2019-12".to_string(),
                gap_end: "2020-07".to_string(),
                duration_months: 7,
            }]
        );
    }

    #[test]
    fn test_short_gap_is_ignored() {
        let text = "Analyst at Gamma (Jan 2016 - Mar 2017) Consultant at Delta (Jun 2017 - Dec 2018)";
        let history = analyzer().analyze(text);

        assert_eq!(history.experience.len(), 2);
        assert!(history.employment_gaps.is_empty());
    }

    #[test]
    fn test_exactly_threshold_is_not_a_gap() {
        let text = "Analyst at Gamma (Jan 2016 - Jan 2017) Consultant at Delta (Jul 2017 - Dec 2018)";
        assert!(analyzer().analyze(text).employment_gaps.is_empty());
    }

    #[test]
    fn test_entries_sorted_chronologically() {
        let text = "Lead @ Later Corp (March 2019 - Present)\nIntern at Early Inc (Jun 2012 - Aug 2012)";
        let history = analyzer().analyze(text);

        assert_eq!(history.experience[0], "Intern at Early Inc (Jun 2012 - Aug 2012)");
        assert_eq!(history.experience[1], "Lead at Later Corp (Mar 2019 - Present)");
        assert_eq!(history.employment_gaps[0].duration_months, 79);
    }

    #[test]
    fn test_missing_months_use_defaults() {
        let entries = analyzer().parse_entries("Developer at Initech (2015 - 2017)");
        assert_eq!(
            entries,
            vec![JobEntry {
                job: "Developer at Initech".to_string(),
                start_date: "Jan 2015".to_string(),
                end_date: "Dec 2017".to_string(),
            }]
        );
    }

    #[test]
    fn test_title_does_not_start_inside_a_token() {
        let entries = analyzer().parse_entries("jane@mail.com Engineer at Acme (Jan 2018 - Dec 2019)");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].job, "Engineer at Acme");
    }

    #[test]
    fn test_title_drops_preceding_heading_words() {
        let entries = analyzer().parse_entries(
            "Jane Smith Work Experience Senior Engineer at Acme (Jan 2018 - Dec 2019) \
             Employment History Lead at Beta (Jul 2020 - Present)",
        );

        assert_eq!(entries[0].job, "Senior Engineer at Acme");
        assert_eq!(entries[1].job, "Lead at Beta");
    }

    #[test]
    fn test_title_is_capped_at_four_words() {
        let entries = analyzer().parse_entries("Jane Smith Principal Staff Software Engineer at Acme (2018 - 2019)");
        assert_eq!(entries[0].job, "Principal Staff Software Engineer at Acme");
    }

    #[test]
    fn test_unparseable_entry_is_skipped() {
        let text = "Ranger at Parks (Summer 2014 - Fall 2014) Engineer at Acme (Jan 2018 - Dec 2019)";
        let history = analyzer().analyze(text);

        assert_eq!(history.experience, vec!["Engineer at Acme (Jan 2018 - Dec 2019)".to_string()]);
        assert!(history.employment_gaps.is_empty());
    }

    #[test]
    fn test_equal_start_dates_keep_text_order() {
        let text = "Advisor at Zeta (Jan 2020 - Present) Founder at Alpha (Jan 2020 - Dec 2020)";
        let history = analyzer().analyze(text);

        assert_eq!(history.experience[0], "Advisor at Zeta (Jan 2020 - Present)");
        assert_eq!(history.experience[1], "Founder at Alpha (Jan 2020 - Dec 2020)");
    }

    #[test]
    fn test_present_resolves_to_reference_date() {
        let text = "Engineer at Acme (Jan 2018 - Present) Consultant at Omega (Jan 2022 - Present)";
        let history = analyzer().analyze(text);

        assert_eq!(history.employment_gaps[0].gap_start, "2021-03");
        assert_eq!(history.employment_gaps[0].gap_end, "2022-01");
        assert_eq!(history.employment_gaps[0].duration_months, 10);
    }

    #[test]
    fn test_custom_threshold() {
        let text = "Analyst at Gamma (Jan 2016 - Mar 2017) Consultant at Delta (Jun 2017 - Dec 2018)";
        let history = analyzer().with_threshold(2).analyze(text);
        assert_eq!(history.employment_gaps.len(), 1);
        assert_eq!(history.employment_gaps[0].duration_months, 3);
    }

    #[test]
    fn test_experience_strings_reparse_to_same_dates() {
        let text = "Engineer at Acme (January 2018 \u{2013} December 2019) Manager at Beta (Jul. 2020 to Current)";
        let analyzer = analyzer();
        let history = analyzer.analyze(text);

        let reparsed: Vec<JobEntry> = history
            .experience
            .iter()
            .flat_map(|line| analyzer.parse_entries(line))
            .collect();

        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed[0].start_date, "Jan 2018");
        assert_eq!(reparsed[0].end_date, "Dec 2019");
        assert_eq!(reparsed[1].start_date, "Jul 2020");
        assert_eq!(reparsed[1].end_date, PRESENT);
        assert_eq!(analyzer.analyze(&history.experience.join(" ")), history);
    }

    #[test]
    fn test_months_until() {
        let end = YearMonth::new(2019, 12).unwrap();
        let start = YearMonth::new(2020, 7).unwrap();
        assert_eq!(end.months_until(&start), 7);
        assert_eq!(start.months_until(&end), -7);
        assert!(YearMonth::new(2020, 13).is_none());
    }
}
