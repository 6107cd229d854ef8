use crate::track::point::TrackPoint;

/// Average display values over consecutive windows of `interval`.
///
/// Speed, altitude, elevation and vario labels change at most once per window so the overlay
/// stays readable at high playback speeds. Results land in the `*_lr` fields.
pub fn limit_refresh_rate(points: &mut [TrackPoint], interval: chrono::Duration) {
    let Some(first) = points.first() else {
        return;
    };
    let mut window_start = first.timestamp;
    let mut acc = WindowAcc::default();
    let mut begin = 0usize;

    for i in 0..points.len() {
        let t = points[i].timestamp;
        if t >= window_start + interval && acc.count > 0 {
            acc.write(&mut points[begin..i]);
            acc = WindowAcc::default();
            begin = i;
            window_start = t;
        }
        acc.push(&points[i]);
    }
    if acc.count > 0 {
        acc.write(&mut points[begin..]);
    }
}

#[derive(Default)]
struct WindowAcc {
    velocity: f64,
    altitude: f64,
    elevation: f64,
    vario: f64,
    count: usize,
}

impl WindowAcc {
    fn push(&mut self, p: &TrackPoint) {
        self.velocity += p.velocity;
        self.altitude += p.altitude;
        self.elevation += p.elevation;
        self.vario += p.vario;
        self.count += 1;
    }

    fn write(&self, out: &mut [TrackPoint]) {
        let n = self.count as f64;
        for p in out {
            p.velocity_lr = Some(self.velocity / n);
            p.altitude_lr = Some(self.altitude / n);
            p.elevation_lr = Some(self.elevation / n);
            p.vario_lr = Some(self.vario / n);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/track/refresh.rs"]
mod tests;
