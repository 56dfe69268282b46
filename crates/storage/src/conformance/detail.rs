use std::future::Future;

use lesson_report_core::{AttributeValue, SubmittingStatus};

use super::{make_detail, make_field_value, make_report, TestResult};
use crate::ReportStorage;

pub(super) async fn run_detail_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "detail",
        "upsert_inserts_details",
        upsert_inserts_details(factory).await,
    ));
    results.push(TestResult::from_result(
        "detail",
        "upsert_keeps_existing_detail_ids",
        upsert_keeps_existing_detail_ids(factory).await,
    ));
    results.push(TestResult::from_result(
        "detail",
        "upsert_removes_unlisted_students",
        upsert_removes_unlisted_students(factory).await,
    ));
    results.push(TestResult::from_result(
        "detail",
        "field_value_upsert_replaces_by_detail_and_field",
        field_value_upsert_replaces_by_detail_and_field(factory).await,
    ));
    results.push(TestResult::from_result(
        "detail",
        "delete_details_and_field_values",
        delete_details_and_field_values(factory).await,
    ));

    results
}

async fn upsert_inserts_details<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Saved),
    )
    .await
    .map_err(|e| format!("create: {e}"))?;
    s.upsert_details(
        &mut snap,
        "report-1",
        vec![
            make_detail("detail-1", "report-1", "student-1"),
            make_detail("detail-2", "report-1", "student-2"),
        ],
    )
    .await
    .map_err(|e| format!("upsert_details: {e}"))?;
    s.commit_snapshot(snap).await.map_err(|e| format!("commit: {e}"))?;

    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin 2: {e}"))?;
    let mut details = s
        .details_by_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("details_by_report: {e}"))?;
    let other = s
        .details_by_report(&mut snap, "report-2")
        .await
        .map_err(|e| format!("details_by_report other: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    details.sort_by(|a, b| a.student_id.cmp(&b.student_id));
    let ids: Vec<_> = details
        .iter()
        .map(|d| (d.lesson_report_detail_id.as_str(), d.student_id.as_str()))
        .collect();
    if ids != [("detail-1", "student-1"), ("detail-2", "student-2")] {
        return Err(format!("unexpected details {:?}", ids));
    }
    if !other.is_empty() {
        return Err(format!("expected no details for report-2, got {:?}", other));
    }
    Ok(())
}

async fn upsert_keeps_existing_detail_ids<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Saved),
    )
    .await
    .map_err(|e| format!("create: {e}"))?;
    s.upsert_details(
        &mut snap,
        "report-1",
        vec![make_detail("detail-1", "report-1", "student-1")],
    )
    .await
    .map_err(|e| format!("first upsert: {e}"))?;

    let mut again = make_detail("detail-fresh", "report-1", "student-1");
    again.created_at = "2030-01-01T00:00:00Z".to_string();
    again.updated_at = "2030-01-01T00:00:00Z".to_string();
    s.upsert_details(&mut snap, "report-1", vec![again])
        .await
        .map_err(|e| format!("second upsert: {e}"))?;
    let details = s
        .details_by_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("details_by_report: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    match details.as_slice() {
        [d] if d.lesson_report_detail_id == "detail-1"
            && d.created_at == "2025-01-01T00:00:00Z"
            && d.updated_at == "2030-01-01T00:00:00Z" =>
        {
            Ok(())
        }
        other => Err(format!(
            "expected detail-1 kept with refreshed updated_at, got {:?}",
            other
        )),
    }
}

async fn upsert_removes_unlisted_students<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Saved),
    )
    .await
    .map_err(|e| format!("create: {e}"))?;
    s.upsert_details(
        &mut snap,
        "report-1",
        vec![
            make_detail("detail-1", "report-1", "student-1"),
            make_detail("detail-2", "report-1", "student-2"),
        ],
    )
    .await
    .map_err(|e| format!("first upsert: {e}"))?;
    s.upsert_field_values(
        &mut snap,
        vec![
            make_field_value("value-1", "detail-1", "title", AttributeValue::string("a")),
            make_field_value("value-2", "detail-2", "title", AttributeValue::string("b")),
        ],
    )
    .await
    .map_err(|e| format!("upsert_field_values: {e}"))?;
    s.upsert_details(
        &mut snap,
        "report-1",
        vec![
            make_detail("detail-x", "report-1", "student-2"),
            make_detail("detail-3", "report-1", "student-3"),
        ],
    )
    .await
    .map_err(|e| format!("second upsert: {e}"))?;
    let mut details = s
        .details_by_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("details_by_report: {e}"))?;
    let values = s
        .field_values_by_details(&mut snap, &["detail-1".to_string(), "detail-2".to_string()])
        .await
        .map_err(|e| format!("field_values_by_details: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    details.sort_by(|a, b| a.student_id.cmp(&b.student_id));
    let ids: Vec<_> = details
        .iter()
        .map(|d| (d.lesson_report_detail_id.as_str(), d.student_id.as_str()))
        .collect();
    if ids != [("detail-2", "student-2"), ("detail-3", "student-3")] {
        return Err(format!("unexpected details after reshaping {:?}", ids));
    }
    // Values of the removed detail go with it.
    match values.as_slice() {
        [v] if v.lesson_report_detail_id == "detail-2" => Ok(()),
        other => Err(format!(
            "expected only detail-2 values to remain, got {:?}",
            other
        )),
    }
}

async fn field_value_upsert_replaces_by_detail_and_field<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.upsert_field_values(
        &mut snap,
        vec![
            make_field_value("value-1", "detail-1", "title", AttributeValue::string("draft")),
            make_field_value("value-2", "detail-1", "ordinal-number", AttributeValue::int(1)),
            make_field_value("value-3", "detail-2", "title", AttributeValue::string("other")),
        ],
    )
    .await
    .map_err(|e| format!("first upsert: {e}"))?;
    s.upsert_field_values(
        &mut snap,
        vec![make_field_value(
            "value-new",
            "detail-1",
            "title",
            AttributeValue::string("final"),
        )],
    )
    .await
    .map_err(|e| format!("second upsert: {e}"))?;
    let values = s
        .field_values_by_details(&mut snap, &["detail-1".to_string()])
        .await
        .map_err(|e| format!("field_values_by_details: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    if values.len() != 2 {
        return Err(format!("expected 2 values for detail-1, got {:?}", values));
    }
    let title = values
        .iter()
        .find(|v| v.field_id == "title")
        .ok_or("title value missing")?;
    if title.value != AttributeValue::string("final") {
        return Err(format!("title not replaced: {:?}", title.value));
    }
    if title.dynamic_form_field_value_id != "value-1" {
        return Err(format!(
            "replaced value must keep its id, got {}",
            title.dynamic_form_field_value_id
        ));
    }
    Ok(())
}

async fn delete_details_and_field_values<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Saved),
    )
    .await
    .map_err(|e| format!("create: {e}"))?;
    s.upsert_details(
        &mut snap,
        "report-1",
        vec![make_detail("detail-1", "report-1", "student-1")],
    )
    .await
    .map_err(|e| format!("upsert_details: {e}"))?;
    s.upsert_field_values(
        &mut snap,
        vec![
            make_field_value("value-1", "detail-1", "title", AttributeValue::string("a")),
            make_field_value("value-2", "detail-9", "title", AttributeValue::string("b")),
        ],
    )
    .await
    .map_err(|e| format!("upsert_field_values: {e}"))?;

    let detail_ids = vec!["detail-1".to_string()];
    s.delete_field_values_by_details(&mut snap, &detail_ids)
        .await
        .map_err(|e| format!("delete_field_values_by_details: {e}"))?;
    s.delete_details_by_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("delete_details_by_report: {e}"))?;

    let details = s
        .details_by_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("details_by_report: {e}"))?;
    let remaining = s
        .field_values_by_details(&mut snap, &["detail-1".to_string(), "detail-9".to_string()])
        .await
        .map_err(|e| format!("field_values_by_details: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    if !details.is_empty() {
        return Err(format!("expected no details, got {:?}", details));
    }
    match remaining.as_slice() {
        [v] if v.lesson_report_detail_id == "detail-9" => Ok(()),
        other => Err(format!(
            "only values of other details must remain, got {:?}",
            other
        )),
    }
}
