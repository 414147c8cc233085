//! The 4-byte span record.

use anyhow::{Result, ensure};

/// One surface record of a VXL column.
///
/// A span is followed on the wire by its inline colors: the top run
/// `[color_start, color_end]` (inclusive), and, when `length > 0`, the
/// bottom run of the column's current solid layer, whose Z positions are
/// implied by the *next* span's `air_start`. `length` counts the span's
/// total size in 4-byte words (`1 + top_len + bottom_len`); `length == 0`
/// marks the column's last span, which carries top colors only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
	/// Word count of this span including colors; 0 terminates the column.
	pub length: u8,
	/// First Z of the top color run.
	pub color_start: u8,
	/// Last Z of the top color run (inclusive).
	pub color_end: u8,
	/// Z where the air above this surface begins (0 on a column's first
	/// span: the world top).
	pub air_start: u8,
}

impl Span {
	pub const WIRE_SIZE: usize = 4;

	/// Total wire size of the span and its colors, in bytes.
	pub fn wire_length(&self) -> usize {
		if self.length > 0 {
			self.length as usize * 4
		} else {
			(self.color_end as usize + 2 - self.color_start as usize) * 4
		}
	}

	/// Number of colors in the top run.
	pub fn top_length(&self) -> usize {
		self.color_end as usize + 1 - self.color_start as usize
	}

	/// Read a span from the head of `data`.
	pub fn read(data: &[u8]) -> Result<Span> {
		ensure!(data.len() >= Span::WIRE_SIZE, "truncated span record");
		let span = Span {
			length: data[0],
			color_start: data[1],
			color_end: data[2],
			air_start: data[3],
		};
		ensure!(
			u16::from(span.color_start) <= u16::from(span.color_end) + 1,
			"span color run is inverted ({} > {} + 1)",
			span.color_start,
			span.color_end
		);
		Ok(span)
	}

	pub fn write(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&[self.length, self.color_start, self.color_end, self.air_start]);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn read_write_round_trip() {
		let span = Span {
			length: 0,
			color_start: 0,
			color_end: 3,
			air_start: 0,
		};
		let mut buf = Vec::new();
		span.write(&mut buf);
		assert_eq!(buf, [0, 0, 3, 0]);
		assert_eq!(Span::read(&buf).unwrap(), span);
	}

	#[test]
	fn wire_length_of_terminal_span_counts_top_colors() {
		let span = Span {
			length: 0,
			color_start: 2,
			color_end: 5,
			air_start: 0,
		};
		// 4 header bytes + 4 colors.
		assert_eq!(span.wire_length(), 20);
		assert_eq!(span.top_length(), 4);
	}

	#[test]
	fn wire_length_of_linked_span_is_its_word_count() {
		let span = Span {
			length: 6,
			color_start: 0,
			color_end: 3,
			air_start: 0,
		};
		assert_eq!(span.wire_length(), 24);
	}

	#[test]
	fn truncated_or_inverted_spans_are_rejected() {
		assert!(Span::read(&[0, 0]).is_err());
		assert!(Span::read(&[0, 5, 2, 0]).is_err());
	}
}
