use std::str::FromStr;

use tracing::debug;

use super::Path;
use crate::error::{ParseError, Result, VecpathError};
use crate::math::{Point, ORIGIN};

/// Number of arguments for each (uppercase) command.
fn argument_count(command: u8) -> usize {
    match command {
        b'M' | b'L' | b'T' => 2,
        b'H' | b'V' => 1,
        b'C' => 6,
        b'S' | b'Q' => 4,
        b'A' => 7,
        _ => 0,
    }
}

fn skip_separators(s: &[u8], mut i: usize) -> usize {
    while i < s.len() && matches!(s[i], b' ' | b',' | b'\n' | b'\r' | b'\t') {
        i += 1;
    }
    i
}

fn starts_number(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+')
}

/// Parses the longest number at the start of `s`, returning it with its byte length.
///
/// The mantissa needs at least one digit; an exponent is only consumed when it has digits.
fn parse_number(s: &[u8]) -> Option<(f64, usize)> {
    let digits = |from: usize| s[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut n = usize::from(matches!(s.first(), Some(b'+' | b'-')));
    let integer = digits(n);
    n += integer;
    let mut fraction = 0;
    if s.get(n) == Some(&b'.') {
        fraction = digits(n + 1);
        if integer + fraction > 0 {
            n += 1 + fraction;
        }
    }
    if integer + fraction == 0 {
        return None;
    }
    if matches!(s.get(n), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(s.get(n + 1), Some(b'+' | b'-')));
        let exponent = digits(n + 1 + sign);
        if exponent > 0 {
            n += 1 + sign + exponent;
        }
    }
    let text = std::str::from_utf8(&s[..n]).ok()?;
    text.parse().ok().map(|v| (v, n))
}

impl Path {
    /// Parses SVG path data.
    ///
    /// Relative commands, implicit command repetition and the `S`/`T` control point
    /// reflections are supported. Arc flags are single `0` or `1` characters and need
    /// no separator.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the data does not start with a command, holds an
    /// unknown command, misses arguments or has a malformed arc flag. Positions are
    /// 1-based.
    pub fn parse_svg(data: &str) -> Result<Path> {
        parse_svg(data.as_bytes()).map_err(|err| {
            debug!(%err, "rejected path data");
            VecpathError::from(err)
        })
    }
}

impl FromStr for Path {
    type Err = VecpathError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse_svg(s)
    }
}

fn parse_svg(s: &[u8]) -> std::result::Result<Path, ParseError> {
    let mut p = Path::new();
    let mut i = skip_separators(s, 0);
    if i == s.len() {
        return Ok(p);
    } else if s[0] == b',' || s[i] < b'A' {
        return Err(ParseError::MissingCommand);
    }

    let mut args = [0.0; 7];
    // last control points of the previous quadratic and cubic commands
    let mut quad_cp = ORIGIN;
    let mut cube_cp = ORIGIN;
    let mut p0 = ORIGIN;
    let mut p1 = ORIGIN;
    let mut prev = b'z';
    loop {
        i = skip_separators(s, i);
        if s.len() <= i {
            break;
        }

        let command_pos = i;
        let mut command = prev;
        let mut repeat = true;
        if matches!(prev, b'z' | b'Z') || !starts_number(s[i]) {
            command = s[i];
            repeat = false;
            i = skip_separators(s, i + 1);
        }

        let upper = command.to_ascii_uppercase();
        let count = argument_count(upper);
        for (j, arg) in args.iter_mut().enumerate().take(count) {
            if upper == b'A' && (j == 3 || j == 4) {
                *arg = match s.get(i) {
                    Some(b'1') => 1.0,
                    Some(b'0') => 0.0,
                    _ => {
                        return Err(ParseError::ArcFlag {
                            command: char::from(command),
                            position: i + 1,
                        })
                    }
                };
                i += 1;
            } else {
                let Some((value, n)) = parse_number(&s[i..]) else {
                    return Err(if repeat && j == 0 && i < s.len() {
                        ParseError::UnknownCommand {
                            command: char::from(s[i]),
                            position: i + 1,
                        }
                    } else if 1 < count {
                        ParseError::ArgumentCount {
                            count,
                            command: char::from(command),
                            position: i + 1,
                        }
                    } else {
                        ParseError::MissingNumber {
                            command: char::from(command),
                            position: i + 1,
                        }
                    });
                };
                *arg = value;
                i += n;
            }
            i = skip_separators(s, i);
        }

        let relative = command.is_ascii_lowercase();
        let offset = if relative { p0 } else { ORIGIN };
        let f = args;
        match upper {
            b'M' => {
                p1 = Point::new(f[0], f[1]) + offset;
                p.move_to(p1.x, p1.y);
                // coordinates following a moveto are implicit linetos
                command = if relative { b'l' } else { b'L' };
            }
            b'Z' => {
                p1 = p.start_pos();
                p.close();
            }
            b'L' => {
                p1 = Point::new(f[0], f[1]) + offset;
                p.line_to(p1.x, p1.y);
            }
            b'H' => {
                p1.x = f[0] + offset.x;
                p.line_to(p1.x, p1.y);
            }
            b'V' => {
                p1.y = f[0] + offset.y;
                p.line_to(p1.x, p1.y);
            }
            b'C' => {
                let cp1 = Point::new(f[0], f[1]) + offset;
                let cp2 = Point::new(f[2], f[3]) + offset;
                p1 = Point::new(f[4], f[5]) + offset;
                p.cube_to(cp1.x, cp1.y, cp2.x, cp2.y, p1.x, p1.y);
                cube_cp = cp2;
            }
            b'S' => {
                let cp1 = if matches!(prev, b'C' | b'c' | b'S' | b's') {
                    p0 * 2.0 - cube_cp
                } else {
                    p0
                };
                let cp2 = Point::new(f[0], f[1]) + offset;
                p1 = Point::new(f[2], f[3]) + offset;
                p.cube_to(cp1.x, cp1.y, cp2.x, cp2.y, p1.x, p1.y);
                cube_cp = cp2;
            }
            b'Q' => {
                let cp = Point::new(f[0], f[1]) + offset;
                p1 = Point::new(f[2], f[3]) + offset;
                p.quad_to(cp.x, cp.y, p1.x, p1.y);
                quad_cp = cp;
            }
            b'T' => {
                let cp = if matches!(prev, b'Q' | b'q' | b'T' | b't') {
                    p0 * 2.0 - quad_cp
                } else {
                    p0
                };
                p1 = Point::new(f[0], f[1]) + offset;
                p.quad_to(cp.x, cp.y, p1.x, p1.y);
                quad_cp = cp;
            }
            b'A' => {
                p1 = Point::new(f[5], f[6]) + offset;
                p.arc_to(f[0], f[1], f[2], f[3] == 1.0, f[4] == 1.0, p1.x, p1.y);
            }
            _ => {
                return Err(ParseError::UnknownCommand {
                    command: char::from(command),
                    position: command_pos + 1,
                })
            }
        }
        prev = command;
        p0 = p1;
    }
    Ok(p)
}
