// Copyright 2026 the Gridflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as tagged little-endian records. [`decode`] reads them back as
//! an iterator of [`RecordedEvent`].

use gridflip_core::geometry::GridGeometry;
use gridflip_core::reveal::PassToken;
use gridflip_core::tile::{Placement, TileState, TileStep, TransitionError};
use gridflip_core::time::{Delay, LogicalTime};
use gridflip_core::trace::{
    CellAssignedEvent, CellMaterializedEvent, CellRevealedEvent, GeometryEvent, PassBeginEvent,
    PassCompleteEvent, RejectedStepEvent, ResizeEvent, StaleActionEvent, TraceSink, TriggerEvent,
};
use kurbo::Size;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_GEOMETRY: u8 = 2;
const TAG_CELL_ASSIGNED: u8 = 3;
const TAG_CELL_MATERIALIZED: u8 = 4;
const TAG_CELL_REVEALED: u8 = 5;
const TAG_PASS_COMPLETE: u8 = 6;
const TAG_STALE_ACTION: u8 = 7;
const TAG_REJECTED_STEP: u8 = 8;
const TAG_RESIZE: u8 = 9;
const TAG_TRIGGER: u8 = 10;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_time(&mut self, t: LogicalTime) {
        self.write_u64(t.micros());
    }

    fn write_pass(&mut self, p: PassToken) {
        self.write_u64(p.get());
    }

    fn write_size(&mut self, s: Size) {
        self.write_f64(s.width);
        self.write_f64(s.height);
    }

    fn write_step(&mut self, s: TileStep) {
        self.write_u8(match s {
            TileStep::Materialize => 0,
            TileStep::Reveal => 1,
        });
    }

    fn write_state(&mut self, s: TileState) {
        self.write_u8(match s {
            TileState::Pending => 0,
            TileState::Materialized => 1,
            TileState::Revealed => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_pass(e.pass);
        // Pass tokens start at 1, so 0 encodes "none superseded".
        self.write_u64(e.superseded.map_or(0, PassToken::get));
        self.write_time(e.at);
        self.write_size(e.viewport);
    }

    fn on_geometry(&mut self, e: &GeometryEvent) {
        self.write_u8(TAG_GEOMETRY);
        self.write_pass(e.pass);
        self.write_u32(e.geometry.columns);
        self.write_u32(e.geometry.rows);
        self.write_u32(e.geometry.cell_count);
        self.write_f64(e.geometry.tile_size);
        self.write_size(e.geometry.container);
        self.write_u32(e.slice_count);
    }

    fn on_cell_assigned(&mut self, e: &CellAssignedEvent) {
        self.write_u8(TAG_CELL_ASSIGNED);
        self.write_pass(e.pass);
        self.write_u32(e.cell);
        self.write_u32(e.slice);
        self.write_time(e.due);
    }

    fn on_cell_materialized(&mut self, e: &CellMaterializedEvent) {
        self.write_u8(TAG_CELL_MATERIALIZED);
        self.write_pass(e.pass);
        self.write_u32(e.cell);
        self.write_u32(e.slice);
        self.write_time(e.at);
        self.write_bool(e.placement == Placement::Replace);
        self.write_bool(e.flipped);
    }

    fn on_cell_revealed(&mut self, e: &CellRevealedEvent) {
        self.write_u8(TAG_CELL_REVEALED);
        self.write_pass(e.pass);
        self.write_u32(e.cell);
        self.write_time(e.at);
        self.write_u32(e.revealed);
        self.write_u32(e.cell_count);
    }

    fn on_pass_complete(&mut self, e: &PassCompleteEvent) {
        self.write_u8(TAG_PASS_COMPLETE);
        self.write_pass(e.pass);
        self.write_time(e.at);
        self.write_u32(e.cell_count);
        self.write_u64(e.elapsed.micros());
    }

    fn on_stale_action(&mut self, e: &StaleActionEvent) {
        self.write_u8(TAG_STALE_ACTION);
        self.write_pass(e.pass);
        self.write_pass(e.current);
        self.write_u32(e.cell);
        self.write_step(e.step);
        self.write_time(e.at);
    }

    fn on_rejected_step(&mut self, e: &RejectedStepEvent) {
        self.write_u8(TAG_REJECTED_STEP);
        self.write_pass(e.pass);
        self.write_u32(e.cell);
        self.write_state(e.error.from);
        self.write_step(e.error.step);
        self.write_time(e.at);
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.write_u8(TAG_RESIZE);
        self.write_time(e.at);
        self.write_size(e.viewport);
        self.write_time(e.until);
        self.write_bool(e.rescheduled);
        self.write_u32(u32::try_from(e.hidden).unwrap_or(u32::MAX));
    }

    fn on_trigger(&mut self, e: &TriggerEvent) {
        self.write_u8(TAG_TRIGGER);
        self.write_time(e.at);
        self.write_size(e.viewport);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`GeometryEvent`].
    Geometry(GeometryEvent),
    /// A [`CellAssignedEvent`].
    CellAssigned(CellAssignedEvent),
    /// A [`CellMaterializedEvent`].
    CellMaterialized(CellMaterializedEvent),
    /// A [`CellRevealedEvent`].
    CellRevealed(CellRevealedEvent),
    /// A [`PassCompleteEvent`].
    PassComplete(PassCompleteEvent),
    /// A [`StaleActionEvent`].
    StaleAction(StaleActionEvent),
    /// A [`RejectedStepEvent`].
    RejectedStep(RejectedStepEvent),
    /// A [`ResizeEvent`].
    Resize(ResizeEvent),
    /// A [`TriggerEvent`].
    Trigger(TriggerEvent),
}

/// Decodes a binary recording into an iterator of events.
///
/// Iteration stops at the end of the data or at the first truncated or
/// unknown record.
#[must_use]
pub fn decode(data: &[u8]) -> DecodeIter<'_> {
    DecodeIter { data, pos: 0 }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.take::<1>()?[0])
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_time(&mut self) -> Option<LogicalTime> {
        Some(LogicalTime(self.read_u64()?))
    }

    fn read_pass(&mut self) -> Option<PassToken> {
        Some(PassToken::from_raw(self.read_u64()?))
    }

    fn read_size(&mut self) -> Option<Size> {
        Some(Size::new(self.read_f64()?, self.read_f64()?))
    }

    fn read_step(&mut self) -> Option<TileStep> {
        Some(match self.read_u8()? {
            0 => TileStep::Materialize,
            _ => TileStep::Reveal,
        })
    }

    fn read_state(&mut self) -> Option<TileState> {
        Some(match self.read_u8()? {
            0 => TileState::Pending,
            1 => TileState::Materialized,
            _ => TileState::Revealed,
        })
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        let pass = self.read_pass()?;
        let superseded = self.read_u64()?;
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            pass,
            superseded: (superseded != 0).then(|| PassToken::from_raw(superseded)),
            at: self.read_time()?,
            viewport: self.read_size()?,
        }))
    }

    fn decode_geometry(&mut self) -> Option<RecordedEvent> {
        let pass = self.read_pass()?;
        let geometry = GridGeometry {
            columns: self.read_u32()?,
            rows: self.read_u32()?,
            cell_count: self.read_u32()?,
            tile_size: self.read_f64()?,
            container: self.read_size()?,
        };
        Some(RecordedEvent::Geometry(GeometryEvent {
            pass,
            geometry,
            slice_count: self.read_u32()?,
        }))
    }

    fn decode_cell_assigned(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CellAssigned(CellAssignedEvent {
            pass: self.read_pass()?,
            cell: self.read_u32()?,
            slice: self.read_u32()?,
            due: self.read_time()?,
        }))
    }

    fn decode_cell_materialized(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CellMaterialized(CellMaterializedEvent {
            pass: self.read_pass()?,
            cell: self.read_u32()?,
            slice: self.read_u32()?,
            at: self.read_time()?,
            placement: if self.read_bool()? {
                Placement::Replace
            } else {
                Placement::Insert
            },
            flipped: self.read_bool()?,
        }))
    }

    fn decode_cell_revealed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CellRevealed(CellRevealedEvent {
            pass: self.read_pass()?,
            cell: self.read_u32()?,
            at: self.read_time()?,
            revealed: self.read_u32()?,
            cell_count: self.read_u32()?,
        }))
    }

    fn decode_pass_complete(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassComplete(PassCompleteEvent {
            pass: self.read_pass()?,
            at: self.read_time()?,
            cell_count: self.read_u32()?,
            elapsed: Delay(self.read_u64()?),
        }))
    }

    fn decode_stale_action(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StaleAction(StaleActionEvent {
            pass: self.read_pass()?,
            current: self.read_pass()?,
            cell: self.read_u32()?,
            step: self.read_step()?,
            at: self.read_time()?,
        }))
    }

    fn decode_rejected_step(&mut self) -> Option<RecordedEvent> {
        let pass = self.read_pass()?;
        let cell = self.read_u32()?;
        let error = TransitionError {
            from: self.read_state()?,
            step: self.read_step()?,
        };
        Some(RecordedEvent::RejectedStep(RejectedStepEvent {
            pass,
            cell,
            error,
            at: self.read_time()?,
        }))
    }

    fn decode_resize(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Resize(ResizeEvent {
            at: self.read_time()?,
            viewport: self.read_size()?,
            until: self.read_time()?,
            rescheduled: self.read_bool()?,
            hidden: self.read_u32()? as usize,
        }))
    }

    fn decode_trigger(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Trigger(TriggerEvent {
            at: self.read_time()?,
            viewport: self.read_size()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_GEOMETRY => self.decode_geometry(),
            TAG_CELL_ASSIGNED => self.decode_cell_assigned(),
            TAG_CELL_MATERIALIZED => self.decode_cell_materialized(),
            TAG_CELL_REVEALED => self.decode_cell_revealed(),
            TAG_PASS_COMPLETE => self.decode_pass_complete(),
            TAG_STALE_ACTION => self.decode_stale_action(),
            TAG_REJECTED_STEP => self.decode_rejected_step(),
            TAG_RESIZE => self.decode_resize(),
            TAG_TRIGGER => self.decode_trigger(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridflip_core::atlas::ImageAtlas;
    use gridflip_core::config::GridConfig;
    use gridflip_core::grid::Grid;
    use gridflip_core::trace::Tracer;

    #[test]
    fn records_a_whole_pass() {
        let mut rec = RecorderSink::new();
        let atlas = ImageAtlas::new("t.jpg", 640, 128).unwrap();
        let mut grid = Grid::new(GridConfig::eager().with_debug(true), atlas).unwrap();
        grid.draw_traced(
            LogicalTime::ZERO,
            Size::new(200.0, 100.0),
            &mut Tracer::new(&mut rec),
        );
        grid.advance_traced(LogicalTime::from_millis(700), &mut Tracer::new(&mut rec));

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        // begin + geometry + 3 assigned + 3 materialized + 3 revealed + complete
        assert_eq!(events.len(), 12);
        match &events[1] {
            RecordedEvent::Geometry(e) => {
                assert_eq!(e.geometry.columns, 2);
                assert_eq!(e.geometry.cell_count, 3);
                assert_eq!(e.slice_count, 5);
                assert_eq!(e.geometry.container, Size::new(200.0, 100.0));
            }
            other => panic!("expected Geometry, got {other:?}"),
        }
        match events.last() {
            Some(RecordedEvent::PassComplete(e)) => {
                assert_eq!(e.pass, PassToken::FIRST);
                assert_eq!(e.cell_count, 3);
                assert_eq!(e.elapsed, Delay::from_millis(700));
            }
            other => panic!("expected PassComplete, got {other:?}"),
        }
    }

    #[test]
    fn keeps_supersession_and_rejections() {
        let mut rec = RecorderSink::new();
        rec.on_pass_begin(&PassBeginEvent {
            pass: PassToken::FIRST.next(),
            superseded: Some(PassToken::FIRST),
            at: LogicalTime(5),
            viewport: Size::new(1.0, 2.0),
        });
        rec.on_rejected_step(&RejectedStepEvent {
            pass: PassToken::FIRST,
            cell: 4,
            error: TransitionError {
                from: TileState::Revealed,
                step: TileStep::Reveal,
            },
            at: LogicalTime(9),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::PassBegin(b), RecordedEvent::RejectedStep(r)] => {
                assert_eq!(b.superseded, Some(PassToken::FIRST));
                assert_eq!(b.viewport, Size::new(1.0, 2.0));
                assert_eq!(r.error.from, TileState::Revealed);
                assert_eq!(r.cell, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_trigger(&TriggerEvent {
            at: LogicalTime(1),
            viewport: Size::new(3.0, 4.0),
        });
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes).count(), 1);
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
        assert_eq!(decode(&[0xff, 1, 2]).count(), 0);
    }
}
