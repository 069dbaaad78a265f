//! Placeholder detection on card templates.
//!
//! Every text slot on a template is painted in a flat reference colour. A
//! slot is found by thresholding the image against that colour, cleaning the
//! mask with an opening (erode then dilate), and reducing each outer contour
//! of the mask to its bounding rectangle.

use crate::core::{BoxOrder, ColorRange, Rect, RegionMap, RegionSpec};
use image::RgbaImage;
use std::collections::VecDeque;

/// Contours enclosing this many square pixels or fewer are treated as noise.
pub const MIN_REGION_AREA: f64 = 50.0;

/// Passes of the 3x3 structuring element for both erosion and dilation.
pub const MORPH_ITERATIONS: usize = 2;

/// Clockwise neighbour offsets (y grows downwards), starting east.
const NEIGHBORS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

#[derive(Debug, Clone)]
pub struct RegionLocator {
    order: BoxOrder,
    min_area: f64,
    iterations: usize,
}

impl Default for RegionLocator {
    fn default() -> Self {
        Self::new(BoxOrder::default())
    }
}

impl RegionLocator {
    pub fn new(order: BoxOrder) -> Self {
        Self {
            order,
            min_area: MIN_REGION_AREA,
            iterations: MORPH_ITERATIONS,
        }
    }

    /// Runs detection for every spec. Labels without a qualifying contour
    /// map to an empty list.
    pub fn locate(&self, image: &RgbaImage, specs: &[RegionSpec]) -> RegionMap {
        let mut regions = RegionMap::default();
        for spec in specs {
            let rects = self.find_boxes(image, &spec.range);
            tracing::debug!("Region '{}': {} box(es) {:?}", spec.label, rects.len(), rects);
            regions.insert(spec.label.clone(), rects);
        }
        regions
    }

    pub fn find_boxes(&self, image: &RgbaImage, range: &ColorRange) -> Vec<Rect> {
        let mut mask = Mask::from_image(image, range);
        for _ in 0..self.iterations {
            mask = mask.eroded();
        }
        for _ in 0..self.iterations {
            mask = mask.dilated();
        }

        let mut rects: Vec<Rect> = external_components(&mask)
            .into_iter()
            .filter(|component| component.area > self.min_area)
            .map(|component| component.bounds)
            .collect();

        match self.order {
            BoxOrder::LeftToRight => rects.sort_by_key(|r| (r.x, r.y)),
            BoxOrder::TopToBottom => rects.sort_by_key(|r| (r.y, r.x)),
            BoxOrder::BottomToTop => rects.sort_by_key(|r| (std::cmp::Reverse(r.y), r.x)),
        }
        rects
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mask {
    width: i32,
    height: i32,
    data: Vec<bool>,
}

impl Mask {
    fn from_image(image: &RgbaImage, range: &ColorRange) -> Self {
        let data = image
            .pixels()
            .map(|p| range.contains([p[0], p[1], p[2]]))
            .collect();
        Self {
            width: image.width() as i32,
            height: image.height() as i32,
            data,
        }
    }

    fn get(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height && self.data[self.index(x, y)]
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// 3x3 minimum. Neighbours outside the image never erode a pixel.
    fn eroded(&self) -> Self {
        self.morph(|mask, x, y| mask.window(x, y).all(|(nx, ny)| mask.get(nx, ny)))
    }

    /// 3x3 maximum. Neighbours outside the image never set a pixel.
    fn dilated(&self) -> Self {
        self.morph(|mask, x, y| mask.window(x, y).any(|(nx, ny)| mask.get(nx, ny)))
    }

    fn morph(&self, keep: impl Fn(&Mask, i32, i32) -> bool) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(keep(self, x, y));
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    fn window(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| (x + dx, y + dy)))
            .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < self.width && ny < self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Component {
    bounds: Rect,
    area: f64,
}

/// Outer contours of the mask: 8-connected foreground components that are not
/// enclosed by a hole of another component.
fn external_components(mask: &Mask) -> Vec<Component> {
    let labels = label_components(mask);
    let outside = outside_background(mask);

    let mut seen = vec![false; labels.count];
    let mut components = Vec::new();
    for y in 0..mask.height {
        for x in 0..mask.width {
            let Some(label) = labels.at(mask, x, y) else {
                continue;
            };
            if seen[label] {
                continue;
            }
            seen[label] = true;

            if !touches_outside(mask, &labels, &outside, label) {
                continue;
            }

            // (x, y) is the first pixel of the component in raster order.
            let contour = trace_contour(|cx, cy| labels.at(mask, cx, cy) == Some(label), (x, y));
            components.push(Component {
                bounds: labels.bounds[label],
                area: polygon_area(&contour),
            });
        }
    }
    components
}

struct Labels {
    ids: Vec<Option<usize>>,
    bounds: Vec<Rect>,
    members: Vec<Vec<(i32, i32)>>,
    count: usize,
}

impl Labels {
    fn at(&self, mask: &Mask, x: i32, y: i32) -> Option<usize> {
        if mask.get(x, y) {
            self.ids[mask.index(x, y)]
        } else {
            None
        }
    }
}

fn label_components(mask: &Mask) -> Labels {
    let mut ids = vec![None; mask.data.len()];
    let mut bounds = Vec::new();
    let mut members = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..mask.height {
        for x in 0..mask.width {
            if !mask.get(x, y) || ids[mask.index(x, y)].is_some() {
                continue;
            }
            let label = bounds.len();
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
            let mut pixels = Vec::new();
            ids[mask.index(x, y)] = Some(label);
            queue.push_back((x, y));

            while let Some((px, py)) = queue.pop_front() {
                pixels.push((px, py));
                min_x = min_x.min(px);
                min_y = min_y.min(py);
                max_x = max_x.max(px);
                max_y = max_y.max(py);
                for (dx, dy) in NEIGHBORS {
                    let (nx, ny) = (px + dx, py + dy);
                    if mask.get(nx, ny) && ids[mask.index(nx, ny)].is_none() {
                        ids[mask.index(nx, ny)] = Some(label);
                        queue.push_back((nx, ny));
                    }
                }
            }

            bounds.push(Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1));
            members.push(pixels);
        }
    }

    Labels {
        count: bounds.len(),
        ids,
        bounds,
        members,
    }
}

/// Background pixels 4-connected to the image border.
fn outside_background(mask: &Mask) -> Vec<bool> {
    let mut outside = vec![false; mask.data.len()];
    let mut queue = VecDeque::new();

    let seed = |x: i32, y: i32, outside: &mut Vec<bool>, queue: &mut VecDeque<(i32, i32)>| {
        if !mask.get(x, y) && !outside[mask.index(x, y)] {
            outside[mask.index(x, y)] = true;
            queue.push_back((x, y));
        }
    };
    for x in 0..mask.width {
        seed(x, 0, &mut outside, &mut queue);
        seed(x, mask.height - 1, &mut outside, &mut queue);
    }
    for y in 0..mask.height {
        seed(0, y, &mut outside, &mut queue);
        seed(mask.width - 1, y, &mut outside, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= mask.width || ny >= mask.height {
                continue;
            }
            seed(nx, ny, &mut outside, &mut queue);
        }
    }
    outside
}

fn touches_outside(mask: &Mask, labels: &Labels, outside: &[bool], label: usize) -> bool {
    labels.members[label].iter().any(|&(x, y)| {
        [(1, 0), (-1, 0), (0, 1), (0, -1)].iter().any(|&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= mask.width || ny >= mask.height {
                return true;
            }
            outside[mask.index(nx, ny)]
        })
    })
}

/// Moore-neighbour tracing of the outer boundary, starting from the
/// component's first pixel in raster order.
fn trace_contour(is_member: impl Fn(i32, i32) -> bool, start: (i32, i32)) -> Vec<(i32, i32)> {
    let step = |from: (i32, i32), first_dir: usize| -> Option<(usize, (i32, i32))> {
        (0..8).map(|k| (first_dir + k) % 8).find_map(|dir| {
            let (dx, dy) = NEIGHBORS[dir];
            let next = (from.0 + dx, from.1 + dy);
            is_member(next.0, next.1).then_some((dir, next))
        })
    };
    // Backtrack is west of the start pixel, so the sweep begins north-west.
    let Some((first_dir, first)) = step(start, 5) else {
        return vec![start];
    };

    let mut contour = vec![start];
    let (mut current, mut dir) = (first, first_dir);
    loop {
        let resume = if dir % 2 == 0 { (dir + 7) % 8 } else { (dir + 6) % 8 };
        let Some((next_dir, next)) = step(current, resume) else {
            break;
        };
        if current == start && next == first {
            break;
        }
        contour.push(current);
        current = next;
        dir = next_dir;
    }
    contour
}

fn polygon_area(points: &[(i32, i32)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&(x0, y0), &(x1, y1))| x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64)
        .sum();
    twice.abs() as f64 / 2.0
}
