//! Transformation matrices and the slice of text state needed to place runs.

/// A PDF transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// Create an identity matrix.
    pub fn identity() -> Self {
        Self::translation(0.0, 0.0)
    }

    /// Create a translation matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_formscan::content::Matrix;
    ///
    /// let m = Matrix::translation(10.0, 20.0);
    /// assert_eq!(m.e, 10.0);
    /// assert_eq!(m.f, 20.0);
    /// ```
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    /// Build from the six operands of `cm` or `Tm`.
    pub fn from_array(m: [f32; 6]) -> Self {
        Self {
            a: m[0],
            b: m[1],
            c: m[2],
            d: m[3],
            e: m[4],
            f: m[5],
        }
    }

    /// The six components in PDF order.
    pub fn to_array(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Multiply this matrix with another matrix.
    ///
    /// The result represents first applying `self`, then applying `other`,
    /// which is the PDF row-vector convention (`Tm × CTM`).
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Text positioning state tracked while walking a content stream.
#[derive(Debug, Clone)]
pub struct TextState {
    /// Current transformation matrix
    pub ctm: Matrix,
    /// Saved CTMs (`q` / `Q`)
    pub ctm_stack: Vec<Matrix>,
    /// Text matrix
    pub text_matrix: Matrix,
    /// Text line matrix
    pub text_line_matrix: Matrix,
    /// Text leading (`TL`)
    pub leading: f32,
    /// Current font size (`Tf`)
    pub font_size: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            ctm_stack: Vec::new(),
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            leading: 0.0,
            font_size: 12.0,
        }
    }
}

impl TextState {
    /// `BT`: reset the text matrices.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.text_line_matrix = Matrix::identity();
    }

    /// `Tm`: replace the text and line matrices.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.text_line_matrix = m;
    }

    /// `Td`: start a new line offset from the current one.
    pub fn move_text(&mut self, tx: f32, ty: f32) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    /// `T*`: start the next line using the current leading.
    pub fn next_line(&mut self) {
        self.move_text(0.0, -self.leading);
    }

    /// Advance the text matrix horizontally after showing text.
    pub fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// Text rendering matrix (`Tm × CTM`) for the next glyph.
    pub fn rendering_matrix(&self) -> Matrix {
        self.text_matrix.multiply(&self.ctm)
    }
}
