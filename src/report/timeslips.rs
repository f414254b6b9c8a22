use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::entities::{Project, Task, Timeslip, User};
use crate::error::Result;
use crate::utils::date::format_iso_date;

/// The fixed CSV header.
pub const CSV_FIELDS: [&str; 7] = [
    "date", "project", "task", "user", "status", "hours", "comment",
];

/// One CSV row per timeslip, foreign keys resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub date: String,
    pub project: String,
    pub task: String,
    pub user: String,
    pub status: String,
    pub hours: Decimal,
    pub comment: String,
}

#[derive(Debug, Default)]
pub struct Report {
    pub rows: Vec<Row>,
    /// Timeslips dropped because a referenced project, task, or user was
    /// absent from the fetched collections.
    pub skipped: usize,
}

/// Join timeslips against projects, tasks, and users. Rows are sorted by
/// date for stable output.
#[must_use]
pub fn build(
    timeslips: &HashMap<String, Timeslip>,
    projects: &HashMap<String, Project>,
    tasks: &HashMap<String, Task>,
    users: &HashMap<String, User>,
) -> Report {
    let mut report = Report::default();
    for timeslip in timeslips.values() {
        let Some(project) = projects.get(&timeslip.project_id.to_string()) else {
            warn!(
                timeslip = timeslip.id,
                project_id = timeslip.project_id,
                "skipping timeslip with unknown project"
            );
            report.skipped += 1;
            continue;
        };
        let Some(task) = tasks.get(&timeslip.task_id.to_string()) else {
            warn!(
                timeslip = timeslip.id,
                task_id = timeslip.task_id,
                "skipping timeslip with unknown task"
            );
            report.skipped += 1;
            continue;
        };
        let Some(user) = users.get(&timeslip.user_id.to_string()) else {
            warn!(
                timeslip = timeslip.id,
                user_id = timeslip.user_id,
                "skipping timeslip with unknown user"
            );
            report.skipped += 1;
            continue;
        };
        report.rows.push(Row {
            date: timeslip.dated_on.map(format_iso_date).unwrap_or_default(),
            project: project.name.clone(),
            task: task.name.clone(),
            user: user.email.clone(),
            status: timeslip.status.clone().unwrap_or_default(),
            hours: timeslip.hours,
            comment: timeslip.comment.clone().unwrap_or_default(),
        });
    }
    report.rows.sort_by(|a, b| {
        (&a.date, &a.project, &a.task, &a.user).cmp(&(&b.date, &b.project, &b.task, &b.user))
    });
    report
}

/// Sum hours grouped by project, then by user, in input order from zero.
#[must_use]
pub fn hours_by_project_and_user(rows: &[Row]) -> BTreeMap<String, BTreeMap<String, Decimal>> {
    let mut totals: BTreeMap<String, BTreeMap<String, Decimal>> = BTreeMap::new();
    for row in rows {
        let by_user = totals.entry(row.project.clone()).or_default();
        *by_user.entry(row.user.clone()).or_insert(Decimal::ZERO) += row.hours;
    }
    totals
}

/// Write the rows as CSV with the fixed header.
pub fn write_csv<W: Write>(rows: &[Row], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(CSV_FIELDS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
