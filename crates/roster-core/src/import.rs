//! Bulk member upload from CSV.
//!
//! Rows are validated first (`valid`, `warning` or `error` with messages), then
//! applied one at a time. A failing row is reported and the batch continues.
//! Row numbers count data rows from 1; the header is not a row.

use crate::certification::Certification;
use crate::config::Config;
use crate::error::{Result, RosterError};
use crate::member::{normalize_email, Member, MemberUpdate, NewMember};
use crate::messaging::normalize_phone;
use crate::skill::Skill;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const LIST_SEPARATOR: char = ';';

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Leave members whose email already exists untouched.
    #[serde(default)]
    pub skip_existing: bool,
    /// Merge rows into members whose email already exists.
    #[serde(default)]
    pub update_existing: bool,
    /// Validate and report without writing anything.
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowValidity {
    Valid,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Created,
    Updated,
    Skipped,
    Error,
}

impl RowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RowStatus::Created => "created",
            RowStatus::Updated => "updated",
            RowStatus::Skipped => "skipped",
            RowStatus::Error => "error",
        }
    }
}

/// One CSV row after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowValidation {
    pub row: usize,
    pub email: String,
    pub validity: RowValidity,
    pub messages: Vec<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowResult {
    pub row: usize,
    pub email: String,
    pub status: RowStatus,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub dry_run: bool,
    pub rows: Vec<RowResult>,
    pub summary: ImportSummary,
    #[serde(skip)]
    source: SourceTable,
}

#[derive(Debug, Clone, Default)]
struct SourceTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl ImportReport {
    /// The uploaded rows with `status` and `messages` columns appended.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header = self.source.headers.clone();
        header.push("status".to_string());
        header.push("messages".to_string());
        writer.write_record(&header)?;
        for (record, result) in self.source.records.iter().zip(&self.rows) {
            let mut out = record.clone();
            out.resize(self.source.headers.len(), String::new());
            out.push(result.status.as_str().to_string());
            out.push(result.messages.join("; "));
            writer.write_record(&out)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RosterError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn normalize_header(h: &str) -> String {
    h.trim().to_ascii_lowercase().replace(' ', "_")
}

struct Columns {
    name: usize,
    email: usize,
    phone: Option<usize>,
    chapter: Option<usize>,
    skills: Option<usize>,
    certifications: Option<usize>,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| normalize_header(h) == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| {
                RosterError::validation("csv", format!("missing required column '{name}'"))
            })
        };
        Ok(Self {
            name: required("name")?,
            email: required("email")?,
            phone: find("phone"),
            chapter: find("chapter"),
            skills: find("skills"),
            certifications: find("certifications"),
        })
    }
}

fn cell(record: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).map(|s| s.trim()).unwrap_or("")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn read_table(text: &str) -> Result<SourceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(SourceTable { headers, records })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_table(root: &Path, table: &SourceTable, config: &Config) -> Result<Vec<RowValidation>> {
    let columns = Columns::locate(&table.headers)?;
    let known_skills: HashSet<String> = Skill::list(root)?
        .into_iter()
        .filter(|s| s.active)
        .map(|s| s.slug)
        .collect();
    let known_certs: HashSet<String> = Certification::list(root)?
        .into_iter()
        .filter(|c| c.active)
        .map(|c| c.slug)
        .collect();
    let country_code = config.country_code();

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(table.records.len());
    for (idx, record) in table.records.iter().enumerate() {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let name = cell(record, Some(columns.name)).to_string();
        if name.is_empty() {
            errors.push("name is required".to_string());
        }

        let raw_email = cell(record, Some(columns.email));
        let email = match normalize_email(raw_email) {
            Ok(email) => {
                if !seen.insert(email.clone()) {
                    errors.push(format!("email '{email}' appears earlier in the file"));
                }
                email
            }
            Err(RosterError::Validation { reason, .. }) => {
                errors.push(format!("email {reason}"));
                raw_email.to_ascii_lowercase()
            }
            Err(e) => return Err(e),
        };

        let raw_phone = cell(record, columns.phone);
        let phone = if raw_phone.is_empty() {
            warnings.push("phone is missing".to_string());
            None
        } else {
            match normalize_phone(raw_phone, &country_code) {
                Ok(p) => Some(p),
                Err(_) => {
                    warnings.push(format!("phone '{raw_phone}' could not be normalised"));
                    Some(raw_phone.to_string())
                }
            }
        };

        let chapter = Some(cell(record, columns.chapter).to_string())
            .filter(|c| !c.is_empty())
            .or_else(|| config.import.default_chapter.clone());

        let mut skills = Vec::new();
        for slug in split_list(cell(record, columns.skills)) {
            if known_skills.contains(&slug) {
                skills.push(slug);
            } else {
                warnings.push(format!("unknown skill '{slug}' dropped"));
            }
        }
        let mut certifications = Vec::new();
        for slug in split_list(cell(record, columns.certifications)) {
            if known_certs.contains(&slug) {
                certifications.push(slug);
            } else {
                warnings.push(format!("unknown certification '{slug}' dropped"));
            }
        }

        let validity = if !errors.is_empty() {
            RowValidity::Error
        } else if !warnings.is_empty() {
            RowValidity::Warning
        } else {
            RowValidity::Valid
        };
        errors.extend(warnings);

        out.push(RowValidation {
            row: idx + 1,
            email,
            validity,
            messages: errors,
            name,
            phone,
            chapter,
            skills,
            certifications,
        });
    }
    Ok(out)
}

/// Validate CSV text against the store without writing anything.
pub fn validate(root: &Path, text: &str, config: &Config) -> Result<Vec<RowValidation>> {
    validate_table(root, &read_table(text)?, config)
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

fn create_member(root: &Path, row: &RowValidation, today: NaiveDate) -> Result<()> {
    let mut member = Member::build(
        root,
        NewMember {
            name: row.name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            chapter: row.chapter.clone(),
            skills: row.skills.clone(),
        },
    )?;
    for cert in &row.certifications {
        member.award_certification(root, cert, today)?;
    }
    member.save(root)
}

fn merge_member(root: &Path, mut member: Member, row: &RowValidation, today: NaiveDate) -> Result<()> {
    member.update(
        root,
        MemberUpdate {
            name: Some(row.name.clone()),
            email: None,
            phone: row.phone.clone(),
            chapter: row.chapter.clone(),
        },
    )?;
    for skill in &row.skills {
        member.add_skill(root, skill)?;
    }
    for cert in &row.certifications {
        if !member.certifications.iter().any(|c| &c.certification == cert) {
            member.award_certification(root, cert, today)?;
        }
    }
    member.save(root)
}

fn apply_row(
    root: &Path,
    row: &RowValidation,
    options: ImportOptions,
    today: NaiveDate,
) -> (RowStatus, Option<String>) {
    let existing = match Member::find_by_email(root, &row.email) {
        Ok(m) => m,
        Err(e) => return (RowStatus::Error, Some(e.to_string())),
    };
    let (status, result) = match existing {
        Some(_) if options.skip_existing => (RowStatus::Skipped, Ok(())),
        Some(member) if options.update_existing => {
            let result = if options.dry_run {
                Ok(())
            } else {
                merge_member(root, member, row, today)
            };
            (RowStatus::Updated, result)
        }
        Some(_) => (
            RowStatus::Error,
            Err(RosterError::MemberExists(row.email.clone())),
        ),
        None => {
            let result = if options.dry_run {
                Ok(())
            } else {
                create_member(root, row, today)
            };
            (RowStatus::Created, result)
        }
    };
    match result {
        Ok(()) => (status, None),
        Err(e) => (RowStatus::Error, Some(e.to_string())),
    }
}

/// Validate and import CSV text. Only a malformed file or missing required
/// column fails the whole call; everything else is reported per row.
pub fn import(root: &Path, text: &str, options: ImportOptions, config: &Config) -> Result<ImportReport> {
    let table = read_table(text)?;
    let validations = validate_table(root, &table, config)?;
    let today = Utc::now().date_naive();

    let mut summary = ImportSummary {
        total: validations.len(),
        ..ImportSummary::default()
    };
    let mut rows = Vec::with_capacity(validations.len());
    for v in validations {
        let mut messages = v.messages.clone();
        let status = if v.validity == RowValidity::Error {
            RowStatus::Error
        } else {
            if v.validity == RowValidity::Warning {
                summary.warnings += 1;
            }
            let (status, error) = apply_row(root, &v, options, today);
            messages.extend(error);
            status
        };
        match status {
            RowStatus::Created => summary.created += 1,
            RowStatus::Updated => summary.updated += 1,
            RowStatus::Skipped => summary.skipped += 1,
            RowStatus::Error => summary.errors += 1,
        }
        rows.push(RowResult {
            row: v.row,
            email: v.email,
            status,
            messages,
        });
    }

    tracing::info!(
        total = summary.total,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        errors = summary.errors,
        dry_run = options.dry_run,
        "member import finished"
    );
    Ok(ImportReport {
        dry_run: options.dry_run,
        rows,
        summary,
        source: table,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
