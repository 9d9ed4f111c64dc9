//! Class filter selection.

use tracing::{debug, info};

use crate::context::Timeouts;
use crate::error::{Error, Result};
use crate::model::ClassGroup;
use crate::portal::Portal;

/// Selects `class_name` in the directory's class filter and waits for the
/// roster to show it.
///
/// Matching is exact on the option label. The filter submit is asynchronous,
/// so completion is detected by polling the group id the pagination control
/// reports until it equals the chosen option's value.
pub async fn select_class<P: Portal>(portal: &P, class_name: &str, timeouts: &Timeouts) -> Result<ClassGroup> {
	let options = portal.class_options().await?;
	if !options.iter().any(|option| option.label == class_name) {
		return Err(Error::ClassNotFound {
			requested: class_name.to_string(),
			available: options.into_iter().map(|option| option.label).collect(),
		});
	}

	let group_id = portal.choose_class(class_name).await?;
	debug!(target = "paideia.class_select", class = class_name, %group_id, "chose class filter option");
	portal.submit_class_filter().await?;

	let expected = group_id.as_str();
	timeouts
		.page_wait()
		.until_true("class filter to apply", || async move {
			Ok::<_, Error>(portal.current_group_id().await?.as_deref() == Some(expected))
		})
		.await?;

	info!(target = "paideia.class_select", class = class_name, %group_id, "class selected");
	Ok(ClassGroup {
		name: class_name.to_string(),
		group_id,
	})
}
