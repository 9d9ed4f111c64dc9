//! End-to-end runs against the in-memory portal.

use std::time::Duration;

use paideia::auth::login;
use paideia::export::layout;
use paideia::{
	Credentials, Dataset, Error, ExportSink, FakeClass, FakeDirectory, FakeParent, FakePortal, FakeStudent, Fidelity, Paginator, RunContext,
	StudentRecord, Timeouts, XlsxSink, scrape_class, select_class, synthetic,
};

const BASE: &str = "https://portal.test/";

fn timeouts() -> Timeouts {
	Timeouts {
		page: Duration::from_millis(80),
		field: Duration::from_millis(30),
		poll_interval: Duration::from_millis(2),
	}
}

fn creds() -> Credentials {
	Credentials::new("parent", "secret")
}

fn roster(prefix: &str, location: &str, count: usize) -> Vec<FakeStudent> {
	(0..count)
		.map(|i| {
			FakeStudent::new(format!("{prefix} {i}"), location)
				.with_id(format!("{prefix}-{i}"))
				.with_parent(FakeParent::new(format!("Parent of {prefix} {i}")).email(format!("p{i}@example.com")))
		})
		.collect()
}

fn school() -> FakeDirectory {
	FakeDirectory::new(BASE)
		.with_class(
			FakeClass::new("Kindergarten", "101")
				.with_page(roster("K", "Kindergarten, Main Building", 3))
				.with_page(roster("KB", "Kindergarten, Main Building", 2))
				.with_page(roster("KC", "Kindergarten", 1)),
		)
		.with_class(
			FakeClass::new("1st Grade", "102").with_page(vec![
				FakeStudent::new("Diana Prince", "1st Grade, Main Building")
					.with_id("d")
					.with_parent(FakeParent::new("Steve Trevor").broken()),
				FakeStudent::new("Eve Wilson", "1st Grade, Main Building")
					.with_id("e")
					.with_parent(FakeParent::new("Bruce Wayne").email("bruce@example.com").mobile("555-0501"))
					.with_parent(FakeParent::new("Selina Kyle").mobile("555-0502")),
			]),
		)
		.with_stale_group_reads(3)
		.with_page_turn_lag(2)
}

#[tokio::test]
async fn unknown_class_lists_every_option() -> anyhow::Result<()> {
	let portal = FakePortal::new(school());
	let session = login(portal, BASE, &creds(), &timeouts()).await?;

	let err = select_class(session.portal(), "First Grade", &timeouts()).await.unwrap_err();
	assert_eq!(err.to_string(), "class 'First Grade' not found; available: Kindergarten, 1st Grade");

	session.close().await?;
	Ok(())
}

#[tokio::test]
async fn paginates_until_next_control_disappears() -> anyhow::Result<()> {
	let portal = FakePortal::new(school());
	let session = login(portal, BASE, &creds(), &timeouts()).await?;
	select_class(session.portal(), "Kindergarten", &timeouts()).await?;

	let mut names: Vec<String> = Vec::new();
	let pages = Paginator::new(session.portal(), timeouts())
		.for_each_page(async |records: Vec<StudentRecord>| {
			assert!(records.iter().all(|r| r.class_name == "Kindergarten"));
			names.extend(records.into_iter().map(|r| r.name));
			Ok(())
		})
		.await?;

	assert_eq!(pages, 3);
	assert_eq!(names.len(), 6);
	assert_eq!(names.first().map(String::as_str), Some("K 0"));
	assert_eq!(names.last().map(String::as_str), Some("KC 0"));
	session.close().await?;
	Ok(())
}

#[tokio::test]
async fn one_broken_parent_keeps_the_rest() -> anyhow::Result<()> {
	let portal = FakePortal::new(school());
	let handle = portal.clone();
	let ctx = RunContext::new(timeouts(), Fidelity::Live);

	let report = login(portal, BASE, &creds(), &ctx.timeouts)
		.await?
		.scoped(|session| Box::pin(async move { scrape_class(session, &ctx, "1st Grade").await }))
		.await?;

	assert!(handle.is_quit());
	assert_eq!(report.students.len(), 2);
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].student, "Diana Prince");

	let diana = &report.students[0];
	assert_eq!(diana.parents.len(), 1);
	assert_eq!(diana.parents[0].email, None);

	let eve = &report.students[1];
	assert_eq!(eve.parents[0].email.as_deref(), Some("bruce@example.com"));
	assert_eq!(eve.parents[1].phone.as_deref(), Some("555-0502"));
	assert_eq!(eve.parents[1].email, None);
	Ok(())
}

#[tokio::test]
async fn classes_run_back_to_back() -> anyhow::Result<()> {
	let portal = FakePortal::new(school());
	let ctx = RunContext::new(timeouts(), Fidelity::Live);

	let dataset = login(portal, BASE, &creds(), &ctx.timeouts)
		.await?
		.scoped(|session| {
			Box::pin(async move {
				let mut dataset = Dataset::new();
				for class in ["1st Grade", "Kindergarten"] {
					dataset.extend(scrape_class(session, &ctx, class).await?.students);
				}
				Ok(dataset)
			})
		})
		.await?;

	assert_eq!(dataset.classes(), ["1st Grade", "Kindergarten"]);
	assert_eq!(dataset.student_count(), 8);
	Ok(())
}

#[tokio::test]
async fn wrong_password_is_fatal() {
	let portal = FakePortal::new(school());
	let handle = portal.clone();
	let err = login(portal, BASE, &Credentials::new("parent", "nope"), &timeouts())
		.await
		.err()
		.unwrap();
	assert!(matches!(err, Error::Authentication { .. }));
	assert!(err.is_fatal());
	assert!(handle.is_quit());
}

#[test]
fn export_pads_short_rows() {
	let dataset: Dataset = synthetic::students().into_iter().filter(|s| s.class_name == "Kindergarten").collect();
	let counts: Vec<_> = dataset.records().iter().map(|s| s.parents.len()).collect();
	assert_eq!(counts, [2, 1, 2]);

	let sheet = &layout(&dataset)[0];
	assert_eq!(sheet.parent_slots(), 2);
	let bob = &sheet.rows[1];
	assert_eq!(bob[0].as_deref(), Some("Bob Smith"));
	assert!(bob[5..].iter().all(Option::is_none));
}

#[test]
fn synthetic_dataset_exports_one_sheet_per_class() -> anyhow::Result<()> {
	let dataset: Dataset = synthetic::students().into_iter().collect();
	assert_eq!(dataset.student_count(), 7);

	let sheets = layout(&dataset);
	let shape: Vec<_> = sheets.iter().map(|s| (s.name.as_str(), s.rows.len(), s.parent_slots())).collect();
	let expected: [(&str, usize, usize); 3] = [("Kindergarten", 3, 2), ("1st Grade", 3, 2), ("2nd Grade", 1, 3)];
	assert_eq!(shape, expected);

	let dir = tempfile::tempdir()?;
	let path = dir.path().join("students.xlsx");
	XlsxSink::new(&path).export(&dataset)?;
	let bytes = std::fs::read(&path)?;
	assert!(bytes.starts_with(b"PK"));
	Ok(())
}
