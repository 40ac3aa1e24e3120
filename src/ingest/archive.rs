//! ZIP archive uploads.

use std::io::{Cursor, Read};

use chrono::NaiveDate;
use zip::ZipArchive;

use super::FileRecord;
use crate::error::{GraphError, Result};

/// Reads every file entry of a ZIP archive into a [`FileRecord`].
///
/// Directory entries are skipped; directories are re-derived from the file paths.
/// Any failure to open the archive or read an entry fails the whole upload, as does
/// an entry whose content does not match the size its header declares.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<FileRecord>> {
	let mut archive =
		ZipArchive::new(Cursor::new(bytes)).map_err(|e| GraphError::MalformedArchive(e.to_string()))?;

	let mut records = Vec::with_capacity(archive.len());
	for i in 0..archive.len() {
		let mut entry = archive
			.by_index(i)
			.map_err(|e| GraphError::MalformedArchive(e.to_string()))?;
		if entry.is_dir() {
			continue;
		}

		let path = entry.name().to_string();
		let last_modified = epoch_millis(entry.last_modified()).unwrap_or(0);
		// The declared size is untrusted: never allocate past the archive itself and
		// never read more than one byte beyond the declaration.
		let declared = entry.size();
		let mut content = Vec::with_capacity(declared.min(bytes.len() as u64) as usize);
		(&mut entry)
			.take(declared.saturating_add(1))
			.read_to_end(&mut content)
			.map_err(|e| GraphError::MalformedArchive(format!("{path}: {e}")))?;
		if content.len() as u64 != declared {
			return Err(GraphError::MalformedArchive(format!(
				"{path}: header declares {declared} bytes, entry holds {}",
				content.len()
			)));
		}

		records.push(FileRecord {
			path,
			size: content.len() as u64,
			content: Some(content),
			last_modified,
		});
	}
	Ok(records)
}

/// Converts a ZIP (MS-DOS, local time treated as UTC) timestamp to Unix milliseconds.
fn epoch_millis(stamp: impl Into<Option<zip::DateTime>>) -> Option<u64> {
	let stamp = stamp.into()?;
	let time = NaiveDate::from_ymd_opt(
		i32::from(stamp.year()),
		u32::from(stamp.month()),
		u32::from(stamp.day()),
	)?
	.and_hms_opt(
		u32::from(stamp.hour()),
		u32::from(stamp.minute()),
		u32::from(stamp.second()),
	)?;
	u64::try_from(time.and_utc().timestamp_millis()).ok()
}
