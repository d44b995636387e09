//! Overlay track geometry kept in step with the circular map view.
//!
//! Every geometry stores coordinates in base pairs modulo the current map
//! size. The owning session forwards each shift and size change through
//! [`MapListener`], so tracks never look at the map store themselves.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colormap::{self, REGION_COLORMAP};
use crate::transform::{log_compress, nan_min_max};
use crate::types::{CurvePoint, GenomicPos, Strand};

/// Receives the two broadcasts a map emits.
pub trait MapListener {
    /// The view moved by `delta_bp` base pairs (positive to the right).
    fn on_shift(&mut self, delta_bp: f64);

    /// The total map size changed. Existing coordinates are not re-wrapped.
    fn on_size_changed(&mut self, new_size_bp: GenomicPos);
}

/// Coordinate modulo the map size; unchanged while no map is open.
pub fn wrap_coordinate(x: f64, map_size_bp: GenomicPos) -> f64 {
    if map_size_bp == 0 {
        x
    } else {
        x.rem_euclid(map_size_bp as f64)
    }
}

/// Fraction range of the region colormap a strand draws its colour from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrandBand {
    pub low: f64,
    pub high: f64,
}

impl StrandBand {
    pub fn for_strand(strand: Strand) -> Self {
        match strand {
            Strand::Forward => Self { low: 0.78, high: 1.0 },
            Strand::Reverse => Self { low: 0.10, high: 0.35 },
            Strand::Unstranded => Self { low: 0.375, high: 0.60 },
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.low && t <= self.high
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.low..=self.high)
    }
}

/// A discrete feature drawn as a bar between two positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    start: f64,
    end: f64,
    map_size_bp: GenomicPos,
    strand: Strand,
    label: String,
    shade: f64,
    color: [u8; 3],
    visible: bool,
}

impl Region {
    pub fn new<R: Rng + ?Sized>(
        start: f64,
        end: f64,
        map_size_bp: GenomicPos,
        strand: Strand,
        label: impl Into<String>,
        rng: &mut R,
    ) -> Self {
        Self::with_palette(start, end, map_size_bp, strand, label, REGION_COLORMAP, rng)
    }

    /// Same as [`Region::new`] but colouring from `palette`. An unknown
    /// palette name leaves the region white.
    pub fn with_palette<R: Rng + ?Sized>(
        start: f64,
        end: f64,
        map_size_bp: GenomicPos,
        strand: Strand,
        label: impl Into<String>,
        palette: &str,
        rng: &mut R,
    ) -> Self {
        let shade = StrandBand::for_strand(strand).pick(rng);
        let color = colormap::sample(palette, shade).unwrap_or([255, 255, 255]);
        let mut region = Self {
            start,
            end,
            map_size_bp,
            strand,
            label: label.into(),
            shade,
            color,
            visible: true,
        };
        region.rewrap();
        region
    }

    /// A region straddling the seam ends up with `start > end`; it is hidden
    /// until a later shift brings it back in one piece.
    fn rewrap(&mut self) {
        self.start = wrap_coordinate(self.start, self.map_size_bp);
        self.end = wrap_coordinate(self.end, self.map_size_bp);
        self.visible = self.start <= self.end;
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn map_size_bp(&self) -> GenomicPos {
        self.map_size_bp
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shade(&self) -> f64 {
        self.shade
    }

    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    pub fn lane(&self) -> i8 {
        self.strand.lane_offset()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl MapListener for Region {
    fn on_shift(&mut self, delta_bp: f64) {
        self.start += delta_bp;
        self.end += delta_bp;
        self.rewrap();
    }

    fn on_size_changed(&mut self, new_size_bp: GenomicPos) {
        self.map_size_bp = new_size_bp;
    }
}

/// A continuous signal sampled at points sorted by x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<CurvePoint>,
    map_size_bp: GenomicPos,
    /// Minimum y recorded when log mode was switched on.
    log_min: Option<f64>,
}

impl Curve {
    pub fn new(points: Vec<CurvePoint>, map_size_bp: GenomicPos) -> Self {
        let mut curve = Self { points, map_size_bp, log_min: None };
        curve.rearrange();
        curve
    }

    fn rearrange(&mut self) {
        for point in &mut self.points {
            point.x = wrap_coordinate(point.x, self.map_size_bp);
        }
        self.points.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn map_size_bp(&self) -> GenomicPos {
        self.map_size_bp
    }

    pub fn is_log(&self) -> bool {
        self.log_min.is_some()
    }

    /// Switch y between linear and log display.
    ///
    /// Going to log remembers the minimum and applies the matrix log
    /// transform; coming back computes `min + 10^y`.
    pub fn toggle_log(&mut self) {
        match self.log_min.take() {
            None => {
                let ys = Array1::from_iter(self.points.iter().map(|p| p.y));
                let min = nan_min_max(&ys).map(|(mi, _)| mi).unwrap_or(f64::NAN);
                let logged = log_compress(&ys);
                for (point, y) in self.points.iter_mut().zip(logged.iter()) {
                    point.y = *y;
                }
                self.log_min = Some(min);
            }
            Some(min) => {
                for point in &mut self.points {
                    point.y = min + 10f64.powf(point.y);
                }
            }
        }
    }
}

impl MapListener for Curve {
    fn on_shift(&mut self, delta_bp: f64) {
        for point in &mut self.points {
            point.x += delta_bp;
        }
        self.rearrange();
    }

    fn on_size_changed(&mut self, new_size_bp: GenomicPos) {
        self.map_size_bp = new_size_bp;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackGeometry {
    Region(Region),
    Curve(Curve),
}

impl MapListener for TrackGeometry {
    fn on_shift(&mut self, delta_bp: f64) {
        match self {
            TrackGeometry::Region(region) => region.on_shift(delta_bp),
            TrackGeometry::Curve(curve) => curve.on_shift(delta_bp),
        }
    }

    fn on_size_changed(&mut self, new_size_bp: GenomicPos) {
        match self {
            TrackGeometry::Region(region) => region.on_size_changed(new_size_bp),
            TrackGeometry::Curve(curve) => curve.on_size_changed(new_size_bp),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Regions,
    Curve,
}

/// One lane of overlays, usually everything read from a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub kind: TrackKind,
    items: Vec<TrackGeometry>,
}

impl Track {
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self { name: name.into(), kind, items: Vec::new() }
    }

    pub fn add(&mut self, item: TrackGeometry) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[TrackGeometry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.items.iter().filter_map(|item| match item {
            TrackGeometry::Region(region) => Some(region),
            TrackGeometry::Curve(_) => None,
        })
    }

    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.items.iter().filter_map(|item| match item {
            TrackGeometry::Curve(curve) => Some(curve),
            TrackGeometry::Region(_) => None,
        })
    }

    /// Regions that are drawn in the current frame.
    pub fn visible_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions().filter(|r| r.is_visible())
    }

    /// Toggle log mode on every curve of the track.
    pub fn toggle_log(&mut self) {
        for item in &mut self.items {
            if let TrackGeometry::Curve(curve) = item {
                curve.toggle_log();
            }
        }
    }
}

impl MapListener for Track {
    fn on_shift(&mut self, delta_bp: f64) {
        for item in &mut self.items {
            item.on_shift(delta_bp);
        }
    }

    fn on_size_changed(&mut self, new_size_bp: GenomicPos) {
        for item in &mut self.items {
            item.on_size_changed(new_size_bp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn xs(curve: &Curve) -> Vec<f64> {
        curve.points().iter().map(|p| p.x).collect()
    }

    #[test]
    fn test_region_shift_into_view() {
        let mut region = Region::new(950.0, 1050.0, 1000, Strand::Unstranded, "r", &mut rng());
        assert_eq!((region.start(), region.end()), (950.0, 50.0));
        assert!(!region.is_visible());

        region.on_shift(100.0);
        assert_eq!((region.start(), region.end()), (50.0, 150.0));
        assert!(region.is_visible());
    }

    #[test]
    fn test_region_across_seam_is_suppressed() {
        let mut region = Region::new(950.0, 1050.0, 1000, Strand::Unstranded, "r", &mut rng());
        region.on_shift(30.0);
        assert_eq!((region.start(), region.end()), (980.0, 80.0));
        assert!(!region.is_visible());

        // It comes back once shifted clear of the seam.
        region.on_shift(50.0);
        assert_eq!((region.start(), region.end()), (30.0, 130.0));
        assert!(region.is_visible());
    }

    #[test]
    fn test_region_negative_shift_wraps_positive() {
        let mut region = Region::new(10.0, 20.0, 1000, Strand::Forward, "r", &mut rng());
        region.on_shift(-30.0);
        assert_eq!((region.start(), region.end()), (980.0, 990.0));
        assert!(region.is_visible());
    }

    #[test]
    fn test_region_without_map_keeps_coordinates() {
        let mut region = Region::new(1500.0, 2500.0, 0, Strand::Reverse, "r", &mut rng());
        assert_eq!((region.start(), region.end()), (1500.0, 2500.0));
        region.on_shift(-2000.0);
        assert_eq!((region.start(), region.end()), (-500.0, 500.0));
    }

    #[test]
    fn test_size_change_does_not_rewrap() {
        let mut region = Region::new(700.0, 900.0, 1000, Strand::Unstranded, "r", &mut rng());
        region.on_size_changed(500);
        assert_eq!(region.map_size_bp(), 500);
        assert_eq!((region.start(), region.end()), (700.0, 900.0));
        region.on_shift(0.0);
        assert_eq!((region.start(), region.end()), (200.0, 400.0));
    }

    #[test]
    fn test_strand_bands_and_lanes() {
        let mut rng = rng();
        let plus = Region::new(0.0, 1.0, 0, Strand::Forward, "", &mut rng);
        let minus = Region::new(0.0, 1.0, 0, Strand::Reverse, "", &mut rng);
        let other = Region::new(0.0, 1.0, 0, Strand::Unstranded, "", &mut rng);

        assert!(StrandBand::for_strand(Strand::Forward).contains(plus.shade()));
        assert!(StrandBand::for_strand(Strand::Reverse).contains(minus.shade()));
        assert!(StrandBand::for_strand(Strand::Unstranded).contains(other.shade()));
        assert_eq!((plus.lane(), minus.lane(), other.lane()), (1, -1, 0));

        let bands =
            [Strand::Forward, Strand::Reverse, Strand::Unstranded].map(StrandBand::for_strand);
        for (i, a) in bands.iter().enumerate() {
            for b in &bands[i + 1..] {
                assert!(a.high < b.low || b.high < a.low);
            }
        }
    }

    #[test]
    fn test_curve_sorted_after_shift() {
        let mut curve =
            Curve::new(vec![CurvePoint::new(10.0, 1.0), CurvePoint::new(990.0, 2.0)], 1000);
        curve.on_shift(50.0);
        assert_eq!(curve.points(), &[CurvePoint::new(40.0, 2.0), CurvePoint::new(60.0, 1.0)]);
    }

    #[test]
    fn test_curve_size_change_does_not_rewrap() {
        let mut curve =
            Curve::new(vec![CurvePoint::new(900.0, 2.0), CurvePoint::new(700.0, 1.0)], 1000);
        curve.on_size_changed(500);
        assert_eq!(curve.map_size_bp(), 500);
        assert_eq!(xs(&curve), vec![700.0, 900.0]);

        curve.on_shift(0.0);
        assert_eq!(curve.points(), &[CurvePoint::new(200.0, 1.0), CurvePoint::new(400.0, 2.0)]);
    }

    #[test]
    fn test_curve_construction_wraps_and_sorts() {
        let curve = Curve::new(
            vec![
                CurvePoint::new(1200.0, 1.0),
                CurvePoint::new(300.0, 2.0),
                CurvePoint::new(-100.0, 3.0),
            ],
            1000,
        );
        assert_eq!(xs(&curve), vec![200.0, 300.0, 900.0]);
    }

    #[test]
    fn test_curve_log_roundtrip() {
        let mut curve = Curve::new(
            vec![CurvePoint::new(1.0, 2.0), CurvePoint::new(2.0, 5.0), CurvePoint::new(3.0, 11.0)],
            0,
        );
        curve.toggle_log();
        assert!(curve.is_log());
        let logged: Vec<f64> = curve.points().iter().map(|p| p.y).collect();
        // min lands on log10(range / 10000)
        assert!((logged[0] - (9.0f64 / 10_000.0).log10()).abs() < 1e-12);

        curve.toggle_log();
        assert!(!curve.is_log());
        let restored: Vec<f64> = curve.points().iter().map(|p| p.y).collect();
        for (y, expected) in restored.iter().zip([2.0, 5.0, 11.0]) {
            // min + 10^log10(y - min + eps) = y + eps
            assert!((y - expected - 9.0 / 10_000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_curve_log_is_zero() {
        let mut curve = Curve::new(vec![CurvePoint::new(1.0, 4.0), CurvePoint::new(2.0, 4.0)], 0);
        curve.toggle_log();
        assert!(curve.points().iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_track_forwards_broadcasts() {
        let mut rng = rng();
        let mut track = Track::new("genes", TrackKind::Regions);
        let a = Region::new(100.0, 200.0, 1000, Strand::Forward, "a", &mut rng);
        let b = Region::new(900.0, 990.0, 1000, Strand::Reverse, "b", &mut rng);
        track.add(TrackGeometry::Region(a));
        track.add(TrackGeometry::Region(b));

        track.on_shift(50.0);
        assert_eq!(track.visible_regions().count(), 1);
        let starts: Vec<f64> = track.regions().map(|r| r.start()).collect();
        assert_eq!(starts, vec![150.0, 950.0]);

        track.on_size_changed(2000);
        assert!(track.regions().all(|r| r.map_size_bp() == 2000));
    }

    #[test]
    fn test_track_json_roundtrip() {
        let mut rng = rng();
        let mut track = Track::new("mixed", TrackKind::Regions);
        let region = Region::new(950.0, 1050.0, 1000, Strand::Reverse, "r", &mut rng);
        track.add(TrackGeometry::Region(region));
        let mut curve =
            Curve::new(vec![CurvePoint::new(10.0, 1.0), CurvePoint::new(20.0, 3.0)], 1000);
        curve.on_shift(-15.0);
        track.add(TrackGeometry::Curve(curve));

        let json = serde_json::to_string(&track).unwrap();
        let restored: Track = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, "mixed");
        assert_eq!(restored.kind, TrackKind::Regions);
        assert_eq!(restored.len(), 2);

        let region = restored.regions().next().unwrap();
        assert_eq!((region.start(), region.end()), (950.0, 50.0));
        assert!(!region.is_visible());
        assert_eq!(region.strand(), Strand::Reverse);
        assert_eq!(region.color(), track.regions().next().unwrap().color());

        let curve = restored.curves().next().unwrap();
        assert_eq!(curve.points(), &[CurvePoint::new(5.0, 3.0), CurvePoint::new(995.0, 1.0)]);
        assert_eq!(curve.map_size_bp(), 1000);
        assert!(!curve.is_log());
    }
}
