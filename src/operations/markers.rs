use crate::math::AffineTransform;
use crate::path::Path;

impl Path {
    /// Places copies of the marker paths at every coordinate of the path.
    ///
    /// `first` goes at the first coordinate, `last` at the final one and `mid` at
    /// all others; a `None` marker is skipped. With `align` set, markers are
    /// rotated so that their x-axis follows the path direction.
    #[must_use]
    pub fn markers(
        &self,
        first: Option<&Path>,
        mid: Option<&Path>,
        last: Option<&Path>,
        align: bool,
    ) -> Vec<Path> {
        let coords = self.coords();
        let dirs = self.coord_directions();
        let n = coords.len();
        coords
            .iter()
            .zip(dirs)
            .enumerate()
            .filter_map(|(i, (pos, dir))| {
                let marker = if i == 0 {
                    first
                } else if i + 1 == n {
                    last
                } else {
                    mid
                }?;
                let mut m = AffineTransform::IDENTITY.translate(pos.x, pos.y);
                if align {
                    m = m.rotate(dir.angle().to_degrees());
                }
                Some(marker.transform(&m))
            })
            .collect()
    }
}
