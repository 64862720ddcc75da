use crate::math::Epsilon;
use crate::path::Path;

/// Index of the pattern entry in effect at the path start and the position,
/// relative to the path start, where that entry begins.
fn dash_start(mut offset: f64, pattern: &[f64]) -> (usize, f64) {
    let mut i = 0;
    while pattern[i] <= offset {
        offset -= pattern[i];
        i = (i + 1) % pattern.len();
    }
    if offset < 0.0 {
        let total: f64 = pattern.iter().sum();
        (i, -(total + offset))
    } else {
        (i, -offset)
    }
}

/// Simplifies a dash pattern and its offset without changing the dashes drawn.
///
/// Zero-length entries are merged into their neighbours and repetitions of a
/// shorter pattern are dropped. An empty result means a solid line, a single
/// zero means nothing is drawn; the latter is also returned for patterns with
/// negative entries.
#[must_use]
pub fn dash_canonical(mut offset: f64, pattern: &[f64], eps: Epsilon) -> (f64, Vec<f64>) {
    let mut d = pattern.to_vec();
    if d.is_empty() {
        return (0.0, d);
    }

    let mut i = 1;
    while i + 1 < d.len() {
        if eps.equal(d[i], 0.0) {
            d[i - 1] += d[i + 1];
            d.drain(i..i + 2);
        } else {
            i += 1;
        }
    }

    // a leading zero gap folds into the last entry
    if eps.equal(d[0], 0.0) {
        if d.len() < 3 {
            return (0.0, vec![0.0]);
        }
        let n = d.len();
        offset -= d[1];
        d[n - 1] += d[1];
        d.drain(..2);
    }

    // a trailing zero gap folds into the first entry
    if d.last().is_some_and(|&v| eps.equal(v, 0.0)) {
        if d.len() < 3 {
            return (0.0, Vec::new());
        }
        let n = d.len();
        offset += d[n - 2];
        d[0] += d[n - 2];
        d.truncate(n - 2);
    }

    if d.iter().any(|&v| v < 0.0 || eps.equal(v, 0.0)) {
        return (0.0, vec![0.0]);
    }

    while d.len() % 2 == 0 {
        let mid = d.len() / 2;
        if !(0..mid).all(|i| eps.equal(d[i], d[mid + i])) {
            break;
        }
        d.truncate(mid);
    }
    (offset, d)
}

/// Cuts a path into dashes.
///
/// The pattern alternates dash and gap lengths, an odd pattern repeats with the
/// roles swapped. A positive offset shifts the pattern backwards along the path.
/// Every subpath restarts the pattern.
pub struct Dash {
    offset: f64,
    pattern: Vec<f64>,
}

impl Dash {
    #[must_use]
    pub fn new(offset: f64, pattern: &[f64]) -> Self {
        Self {
            offset,
            pattern: pattern.to_vec(),
        }
    }

    /// Executes the dashing, returning the dashes as open subpaths.
    ///
    /// On a closed subpath a dash running over its start is joined into one.
    #[must_use]
    pub fn execute(&self, path: &Path) -> Path {
        let eps = path.epsilon();
        let (offset, mut d) = dash_canonical(self.offset, &self.pattern, eps);
        match d.as_slice() {
            [] => return path.clone(),
            [v] if eps.equal(*v, 0.0) => return path.empty_like(),
            _ => {}
        }
        if d.len() % 2 == 1 {
            // odd indices are always gaps
            d.extend_from_within(..);
        }

        let (i0, pos0) = dash_start(offset, &d);
        let mut out = path.empty_like();
        for sub in path.split() {
            let mut i = i0;
            let mut pos = pos0;
            let mut cuts = Vec::new();
            let length = sub.length();
            while pos + d[i] + eps.0 < length {
                pos += d[i];
                if 0.0 < pos {
                    cuts.push(pos);
                }
                i = (i + 1) % d.len();
            }

            let ends_in_dash = i % 2 == 0;
            let first = usize::from((cuts.len() % 2 == 1) == ends_in_dash);
            let pieces = sub.split_at(&cuts);
            let mut dashes = sub.empty_like();
            for piece in pieces
                .iter()
                .take(pieces.len().saturating_sub(1))
                .skip(first)
                .step_by(2)
            {
                dashes = dashes.append(piece);
            }
            if ends_in_dash {
                if let Some(last) = pieces.last() {
                    dashes = if sub.closed() {
                        last.join(&dashes)
                    } else {
                        dashes.append(last)
                    };
                }
            }
            out = out.append(&dashes);
        }
        out
    }
}

impl Path {
    /// Dashes the path, see [`Dash`].
    #[must_use]
    pub fn dash(&self, offset: f64, pattern: &[f64]) -> Path {
        Dash::new(offset, pattern).execute(self)
    }
}
