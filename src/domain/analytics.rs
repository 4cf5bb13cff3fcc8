//! Click analytics aggregation.
//!
//! Analytics are built in two steps. A [`ClickSummary`] holds pre-grouped
//! counts for a set of aliases: totals and OS/device groups over every click,
//! and per-day counts since the start of the trailing window. The PostgreSQL
//! click repository computes it in SQL; [`summarize`] computes the same thing
//! from raw events for stores without aggregation. The snapshot builders then
//! shape a summary into the served responses.
//!
//! Days are UTC calendar dates, newest first, with empty days omitted. Unique
//! users are distinct non-null IP addresses.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::entities::{ClickEvent, UrlMapping};

pub const TRAILING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_clicks: u64,
    pub unique_users: u64,
    pub clicks_by_date: Vec<DailyClicks>,
    pub os_type: Vec<OsBreakdown>,
    pub device_type: Vec<DeviceBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub click_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsBreakdown {
    pub os_name: String,
    pub unique_clicks: u64,
    pub unique_users: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBreakdown {
    pub device_name: String,
    pub unique_clicks: u64,
    pub unique_users: u64,
}

/// Analytics for every alias carrying one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalytics {
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
    pub urls: Vec<AliasSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasSummary {
    pub alias: String,
    pub short_url: String,
    pub total_clicks: u64,
    pub unique_users: u64,
}

/// Analytics across every alias created by one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerAnalytics {
    pub total_urls: u64,
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
}

/// Click and distinct-IP counts for one group value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub name: String,
    pub clicks: u64,
    pub unique_users: u64,
}

/// Pre-grouped click counts for a set of aliases.
///
/// Group order is unspecified; the snapshot builders sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickSummary {
    pub total_clicks: u64,
    pub unique_users: u64,
    pub per_alias: Vec<GroupCount>,
    /// Only days at or after the window start.
    pub by_date: Vec<DailyClicks>,
    pub by_os: Vec<GroupCount>,
    pub by_device: Vec<GroupCount>,
}

/// Start of the trailing per-day window for a query issued at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(TRAILING_WINDOW_DAYS)
}

fn distinct_ips<'a>(clicks: impl IntoIterator<Item = &'a ClickEvent>) -> u64 {
    clicks
        .into_iter()
        .filter_map(|c| c.ip_address.as_deref())
        .collect::<HashSet<_>>()
        .len() as u64
}

fn group_by<'a, F>(clicks: &'a [ClickEvent], key: F) -> Vec<GroupCount>
where
    F: Fn(&'a ClickEvent) -> &'a str,
{
    let mut groups: HashMap<&str, (u64, HashSet<&str>)> = HashMap::new();

    for click in clicks {
        let entry = groups.entry(key(click)).or_default();
        entry.0 += 1;
        if let Some(ip) = click.ip_address.as_deref() {
            entry.1.insert(ip);
        }
    }

    groups
        .into_iter()
        .map(|(name, (clicks, ips))| GroupCount {
            name: name.to_string(),
            clicks,
            unique_users: ips.len() as u64,
        })
        .collect()
}

/// Builds a [`ClickSummary`] from raw events.
pub fn summarize(clicks: &[ClickEvent], since: DateTime<Utc>) -> ClickSummary {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for click in clicks.iter().filter(|c| c.clicked_at >= since) {
        *days.entry(click.clicked_at.date_naive()).or_default() += 1;
    }

    ClickSummary {
        total_clicks: clicks.len() as u64,
        unique_users: distinct_ips(clicks),
        per_alias: group_by(clicks, |c| c.alias.as_str()),
        by_date: days
            .into_iter()
            .rev()
            .map(|(date, click_count)| DailyClicks { date, click_count })
            .collect(),
        by_os: group_by(clicks, |c| c.os_name.as_str()),
        by_device: group_by(clicks, |c| c.device_type.as_str()),
    }
}

/// Clicks descending, then name ascending.
fn ranked(groups: &[GroupCount]) -> Vec<&GroupCount> {
    let mut rows: Vec<&GroupCount> = groups.iter().collect();
    rows.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Shapes a summary into the per-alias snapshot.
pub fn snapshot(summary: &ClickSummary) -> AnalyticsSnapshot {
    let mut clicks_by_date = summary.by_date.clone();
    clicks_by_date.sort_by(|a, b| b.date.cmp(&a.date));

    AnalyticsSnapshot {
        total_clicks: summary.total_clicks,
        unique_users: summary.unique_users,
        clicks_by_date,
        os_type: ranked(&summary.by_os)
            .into_iter()
            .map(|g| OsBreakdown {
                os_name: g.name.clone(),
                unique_clicks: g.clicks,
                unique_users: g.unique_users,
            })
            .collect(),
        device_type: ranked(&summary.by_device)
            .into_iter()
            .map(|g| DeviceBreakdown {
                device_name: g.name.clone(),
                unique_clicks: g.clicks,
                unique_users: g.unique_users,
            })
            .collect(),
    }
}

/// Topic analytics over `summary`.
///
/// `urls` lists every mapping in alias order, including those without clicks.
/// The top-level unique user count is taken over the union of all clicks, so it
/// can be lower than the sum of the per-alias counts.
pub fn aggregate_topic(
    mappings: &[UrlMapping],
    summary: &ClickSummary,
    base_url: &str,
) -> TopicAnalytics {
    let per_alias: HashMap<&str, &GroupCount> = summary
        .per_alias
        .iter()
        .map(|g| (g.name.as_str(), g))
        .collect();

    let mut sorted: Vec<&UrlMapping> = mappings.iter().collect();
    sorted.sort_by(|a, b| a.alias.cmp(&b.alias));

    let urls = sorted
        .into_iter()
        .map(|mapping| {
            let counts = per_alias.get(mapping.alias.as_str());

            AliasSummary {
                alias: mapping.alias.clone(),
                short_url: mapping.short_url(base_url),
                total_clicks: counts.map_or(0, |g| g.clicks),
                unique_users: counts.map_or(0, |g| g.unique_users),
            }
        })
        .collect();

    TopicAnalytics {
        snapshot: snapshot(summary),
        urls,
    }
}

/// Owner analytics over `summary`.
pub fn aggregate_owner(mappings: &[UrlMapping], summary: &ClickSummary) -> OwnerAnalytics {
    OwnerAnalytics {
        total_urls: mappings.len() as u64,
        snapshot: snapshot(summary),
    }
}
