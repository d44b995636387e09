//! Browser session: one contact map, its colormap and the tracks aligned to it.
//!
//! The session owns the [`MapStore`] and every subscriber. Each action runs to
//! completion and delivers its shift and size broadcasts before returning, so
//! track coordinates always agree with [`Browser::current_view`].

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::colormap::{self, LookupTable, DEFAULT_COLORMAP, REGION_COLORMAP};
use crate::error::{ProhicError, ProhicResult};
use crate::io::{
    self, bed, bedgraph, detect_track_format, gff, ContactSource, FeatureRecord, SignalRecord,
    TrackFormat,
};
use crate::store::{MapStore, StoreDefaults};
use crate::summary::MapSummary;
use crate::track::{Curve, MapListener, Region, Track, TrackGeometry, TrackKind};
use crate::types::{ContactMatrix, Resolution};

pub type TrackId = usize;
pub type ListenerId = usize;

/// Startup values for a [`Browser`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub defaults: StoreDefaults,
    pub colormap: String,
    pub region_palette: String,
    /// Seed for region colours; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            defaults: StoreDefaults::default(),
            colormap: DEFAULT_COLORMAP.to_string(),
            region_palette: REGION_COLORMAP.to_string(),
            seed: None,
        }
    }
}

pub struct Browser {
    store: MapStore,
    source: Option<Box<dyn ContactSource>>,
    colormap: String,
    lookup: LookupTable,
    region_palette: String,
    tracks: Vec<(TrackId, Track)>,
    listeners: Vec<(ListenerId, Box<dyn MapListener>)>,
    next_id: usize,
    rng: StdRng,
}

impl Browser {
    pub fn new() -> ProhicResult<Self> {
        Self::with_settings(SessionSettings::default())
    }

    pub fn with_settings(settings: SessionSettings) -> ProhicResult<Self> {
        let lookup = colormap::build_lookup_table(&settings.colormap)?;
        colormap::definition(&settings.region_palette)?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            store: MapStore::with_defaults(settings.defaults),
            source: None,
            colormap: settings.colormap,
            lookup,
            region_palette: settings.region_palette,
            tracks: Vec::new(),
            listeners: Vec::new(),
            next_id: 0,
            rng,
        })
    }

    /// Open a contact map file. Nothing changes if the file cannot be read.
    pub fn open<P: AsRef<Path>>(
        &mut self,
        path: P,
        resolution: Option<Resolution>,
    ) -> ProhicResult<()> {
        let source = io::open_source(path)?;
        self.open_source(source, resolution)
    }

    /// Load from an already opened source, replacing any current map.
    ///
    /// Tracks are moved back by the old shift (the load resets it) and then
    /// told the new map size.
    pub fn open_source(
        &mut self,
        source: Box<dyn ContactSource>,
        resolution: Option<Resolution>,
    ) -> ProhicResult<()> {
        let undo = -self.accumulated_shift();
        self.store.load(source.as_ref(), resolution)?;
        self.source = Some(source);

        if undo != 0.0 {
            self.broadcast_shift(undo);
        }
        self.broadcast_size();
        Ok(())
    }

    /// Reload the current map at another resolution.
    pub fn set_resolution(&mut self, resolution: Resolution) -> ProhicResult<()> {
        let source = self.source.take().ok_or(ProhicError::NoMapOpen)?;
        let undo = -self.accumulated_shift();
        let loaded = self.store.load(source.as_ref(), Some(resolution));
        self.source = Some(source);
        loaded?;

        if undo != 0.0 {
            self.broadcast_shift(undo);
        }
        self.broadcast_size();
        Ok(())
    }

    /// Close the map. Tracks are closed with it; listeners are told about the
    /// un-shift and the size dropping to 0.
    pub fn close(&mut self) {
        if !self.store.is_loaded() {
            return;
        }
        let undo = -self.accumulated_shift();
        if undo != 0.0 {
            self.broadcast_shift(undo);
        }
        self.store.close();
        self.source = None;
        self.broadcast_size();

        if !self.tracks.is_empty() {
            log::info!("Closing {} track(s) with the map", self.tracks.len());
            self.tracks.clear();
        }
    }

    pub fn set_colormap(&mut self, name: &str) -> ProhicResult<()> {
        self.lookup = colormap::build_lookup_table(name)?;
        self.colormap = name.to_string();
        Ok(())
    }

    pub fn toggle_oe(&mut self) {
        self.store.toggle_observed_over_expected();
    }

    pub fn toggle_log(&mut self) {
        self.store.toggle_log();
    }

    pub fn shift_left(&mut self) {
        self.step(-1);
    }

    pub fn shift_right(&mut self) {
        self.step(1);
    }

    fn step(&mut self, direction: i32) {
        if !self.store.is_loaded() {
            return;
        }
        self.store.set_shift(direction);
        self.broadcast_shift(direction as f64 * self.store.shift_step_bp());
    }

    /// Read a `.bed`, `.gff*` or `.bedgraph` file into a new track.
    pub fn import_track<P: AsRef<Path>>(&mut self, path: P) -> ProhicResult<TrackId> {
        let path = path.as_ref();
        let format = detect_track_format(path)
            .ok_or_else(|| ProhicError::UnsupportedTrack { path: path.to_path_buf() })?;
        let name = track_name(path);

        let id = match format {
            TrackFormat::Bed => {
                let records = bed::read_bed(path)?;
                self.import_regions(name, &records)
            }
            TrackFormat::Gff => {
                let records = gff::read_gff(path)?;
                self.import_regions(name, &records)
            }
            TrackFormat::BedGraph => {
                let records = bedgraph::read_bedgraph(path)?;
                self.import_signal(name, &records)
            }
        };
        Ok(id)
    }

    /// Add one region per record, offset so they line up with the shifted view.
    pub fn import_regions(
        &mut self,
        name: impl Into<String>,
        records: &[FeatureRecord],
    ) -> TrackId {
        let offset = self.accumulated_shift();
        let size = self.store.size_bp();
        let mut track = Track::new(name, TrackKind::Regions);
        for record in records {
            track.add(TrackGeometry::Region(Region::with_palette(
                record.start as f64 + offset,
                record.end as f64 + offset,
                size,
                record.strand,
                record.label.clone(),
                &self.region_palette,
                &mut self.rng,
            )));
        }
        self.add_track(track)
    }

    /// Add a curve through the interval midpoints.
    pub fn import_signal(&mut self, name: impl Into<String>, records: &[SignalRecord]) -> TrackId {
        let offset = self.accumulated_shift();
        let mut points = bedgraph::to_curve_points(records);
        for point in &mut points {
            point.x += offset;
        }
        let mut track = Track::new(name, TrackKind::Curve);
        track.add(TrackGeometry::Curve(Curve::new(points, self.store.size_bp())));
        self.add_track(track)
    }

    fn add_track(&mut self, track: Track) -> TrackId {
        let id = self.allocate_id();
        log::info!("Imported track {} ({} items) as #{}", track.name, track.len(), id);
        self.tracks.push((id, track));
        id
    }

    pub fn close_track(&mut self, id: TrackId) -> ProhicResult<Track> {
        let index = self
            .tracks
            .iter()
            .position(|(track_id, _)| *track_id == id)
            .ok_or(ProhicError::UnknownTrack(id))?;
        Ok(self.tracks.remove(index).1)
    }

    pub fn toggle_track_log(&mut self, id: TrackId) -> ProhicResult<()> {
        self.tracks
            .iter_mut()
            .find(|(track_id, _)| *track_id == id)
            .map(|(_, track)| track.toggle_log())
            .ok_or(ProhicError::UnknownTrack(id))
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|(track_id, _)| *track_id == id).map(|(_, track)| track)
    }

    pub fn tracks(&self) -> impl Iterator<Item = (TrackId, &Track)> {
        self.tracks.iter().map(|(id, track)| (*id, track))
    }

    /// Register an extra subscriber for shift and size broadcasts.
    pub fn subscribe(&mut self, listener: Box<dyn MapListener>) -> ListenerId {
        let id = self.allocate_id();
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn summary(&self) -> MapSummary {
        MapSummary::from_store(&self.store, &self.colormap)
    }

    pub fn current_view(&self) -> ContactMatrix {
        self.store.current_view()
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    pub fn colormap(&self) -> &str {
        &self.colormap
    }

    pub fn lookup_table(&self) -> &LookupTable {
        &self.lookup
    }

    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Sum of every step broadcast since the last load.
    fn accumulated_shift(&self) -> f64 {
        self.store.shift_units() as f64 * self.store.shift_step_bp()
    }

    fn broadcast_shift(&mut self, delta_bp: f64) {
        log::debug!("Broadcasting shift of {} bp", delta_bp);
        for (_, track) in &mut self.tracks {
            track.on_shift(delta_bp);
        }
        for (_, listener) in &mut self.listeners {
            listener.on_shift(delta_bp);
        }
    }

    fn broadcast_size(&mut self) {
        let size = self.store.size_bp();
        log::debug!("Broadcasting map size {} bp", size);
        for (_, track) in &mut self.tracks {
            track.on_size_changed(size);
        }
        for (_, listener) in &mut self.listeners {
            listener.on_size_changed(size);
        }
    }
}

/// Track name: the file name up to its first dot.
fn track_name(path: &Path) -> String {
    let file = io::matrix::display_name(path);
    match file.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySource;
    use crate::types::Strand;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Shift(f64),
        Size(u64),
    }

    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl MapListener for Recorder {
        fn on_shift(&mut self, delta_bp: f64) {
            self.0.borrow_mut().push(Event::Shift(delta_bp));
        }

        fn on_size_changed(&mut self, new_size_bp: u64) {
            self.0.borrow_mut().push(Event::Size(new_size_bp));
        }
    }

    fn seeded() -> Browser {
        Browser::with_settings(SessionSettings { seed: Some(1), ..SessionSettings::default() })
            .unwrap()
    }

    // 100 bins of 5 kb: 500 kb total, 5 kb per shift step.
    fn hundred_bins() -> Box<dyn ContactSource> {
        Box::new(MemorySource::multi(
            "sample.mcool",
            vec![(5000, ContactMatrix::ones((100, 100))), (10000, ContactMatrix::ones((50, 50)))],
        ))
    }

    fn feature(start: u64, end: u64) -> FeatureRecord {
        FeatureRecord { start, end, label: "f".to_string(), strand: Strand::Forward }
    }

    fn region_bounds(browser: &Browser, id: TrackId) -> Vec<(f64, f64)> {
        browser.track(id).unwrap().regions().map(|r| (r.start(), r.end())).collect()
    }

    #[test]
    fn test_shift_broadcast_moves_regions() {
        let mut browser = seeded();
        browser.open_source(hundred_bins(), None).unwrap();
        let id = browser.import_regions("genes", &[feature(1000, 2000)]);

        for _ in 0..3 {
            browser.shift_right();
        }
        assert_eq!(region_bounds(&browser, id), vec![(16000.0, 17000.0)]);

        browser.shift_left();
        assert_eq!(region_bounds(&browser, id), vec![(11000.0, 12000.0)]);
        assert_eq!(browser.summary().shift_bp, 10000);
    }

    #[test]
    fn test_import_lands_on_shifted_view() {
        let mut browser = seeded();
        browser.open_source(hundred_bins(), None).unwrap();
        browser.shift_left();
        let id = browser.import_regions("genes", &[feature(10000, 20000)]);
        assert_eq!(region_bounds(&browser, id), vec![(5000.0, 15000.0)]);
    }

    #[test]
    fn test_reload_undoes_shift_then_resizes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut browser = seeded();
        browser.subscribe(Box::new(Recorder(events.clone())));

        browser.open_source(hundred_bins(), None).unwrap();
        let id = browser.import_regions("genes", &[feature(1000, 2000)]);
        browser.shift_right();
        browser.shift_right();
        browser.set_resolution(10000).unwrap();

        assert_eq!(browser.store().resolution(), 10000);
        assert_eq!(browser.store().shift_units(), 0);
        assert_eq!(region_bounds(&browser, id), vec![(1000.0, 2000.0)]);
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Size(500_000),
                Event::Shift(5000.0),
                Event::Shift(5000.0),
                Event::Shift(-10000.0),
                Event::Size(500_000),
            ]
        );
    }

    #[test]
    fn test_close_unshifts_and_drops_tracks() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut browser = seeded();
        browser.open_source(hundred_bins(), None).unwrap();
        browser.import_regions("genes", &[feature(1000, 2000)]);
        browser.subscribe(Box::new(Recorder(events.clone())));

        browser.shift_left();
        browser.close();

        assert_eq!(
            *events.borrow(),
            vec![Event::Shift(-5000.0), Event::Shift(5000.0), Event::Size(0)]
        );
        assert_eq!(browser.tracks().count(), 0);
        assert_eq!(browser.summary().to_string(), "No map is opened");

        // A second close has nothing to say.
        browser.close();
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn test_failed_open_changes_nothing() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut browser = seeded();
        browser.open_source(hundred_bins(), None).unwrap();
        browser.shift_right();
        browser.subscribe(Box::new(Recorder(events.clone())));

        let bad = Box::new(MemorySource::flat("bad", ContactMatrix::zeros((2, 3))));
        assert!(browser.open_source(bad, None).is_err());
        assert!(events.borrow().is_empty());
        assert_eq!(browser.store().shift_units(), 1);
        assert_eq!(browser.store().name(), Some("sample.mcool"));
    }

    #[test]
    fn test_shift_without_map_is_silent() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut browser = seeded();
        browser.subscribe(Box::new(Recorder(events.clone())));
        browser.shift_right();
        browser.shift_left();
        assert!(events.borrow().is_empty());
        assert!(matches!(browser.set_resolution(5000), Err(ProhicError::NoMapOpen)));
    }

    #[test]
    fn test_unsubscribe() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut browser = seeded();
        let id = browser.subscribe(Box::new(Recorder(events.clone())));
        assert!(browser.unsubscribe(id));
        assert!(!browser.unsubscribe(id));
        browser.open_source(hundred_bins(), None).unwrap();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_track_lifecycle() {
        let mut browser = seeded();
        browser.open_source(hundred_bins(), None).unwrap();
        let signal = [
            SignalRecord { start: 0, end: 10, value: 3.0 },
            SignalRecord { start: 10, end: 20, value: 7.0 },
        ];
        let curve_id = browser.import_signal("coverage", &signal);

        browser.toggle_track_log(curve_id).unwrap();
        assert!(browser.track(curve_id).unwrap().curves().all(|c| c.is_log()));

        let closed = browser.close_track(curve_id).unwrap();
        assert_eq!(closed.kind, TrackKind::Curve);
        assert!(matches!(browser.close_track(curve_id), Err(ProhicError::UnknownTrack(_))));
        assert!(matches!(browser.toggle_track_log(curve_id), Err(ProhicError::UnknownTrack(_))));
    }

    #[test]
    fn test_colormap_selection() {
        let mut browser = seeded();
        assert_eq!(browser.colormap(), "magma");
        browser.set_colormap("viridis").unwrap();
        assert_eq!(browser.colormap(), "viridis");
        assert!(browser.set_colormap("no-such-map").is_err());
        assert_eq!(browser.colormap(), "viridis");
        assert_eq!(browser.lookup_table().len(), 256);

        let bad = SessionSettings { colormap: "nope".to_string(), ..SessionSettings::default() };
        assert!(Browser::with_settings(bad).is_err());
    }

    #[test]
    fn test_unsupported_track_extension() {
        let mut browser = seeded();
        let err = browser.import_track("reads.bam").unwrap_err();
        assert!(matches!(err, ProhicError::UnsupportedTrack { .. }));
    }

    #[test]
    fn test_track_name_drops_extensions() {
        assert_eq!(track_name(Path::new("data/peaks.bed")), "peaks");
        assert_eq!(track_name(Path::new("genes.v2.gff3.gz")), "genes");
        assert_eq!(track_name(Path::new("coverage")), "coverage");
        assert_eq!(track_name(Path::new(".hidden.bed")), ".hidden.bed");
    }
}
