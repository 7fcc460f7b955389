use crate::error::TxError;

pub struct Reader<'a> {
    b: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    pub fn new(b: &'a [u8]) -> Self {
        Self { b, off: 0 }
    }

    pub fn offset(&self) -> usize {
        self.off
    }

    pub fn remaining(&self) -> usize {
        self.b.len() - self.off
    }

    pub fn read_u8(&mut self) -> Result<u8, TxError> {
        if self.off + 1 > self.b.len() {
            return Err(TxError::parse("unexpected EOF (u8)"));
        }
        let v = self.b[self.off];
        self.off += 1;
        Ok(v)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], TxError> {
        if n > self.remaining() {
            return Err(TxError::parse("unexpected EOF (bytes)"));
        }
        let v = &self.b[self.off..self.off + n];
        self.off += n;
        Ok(v)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TxError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Fails unless every input byte has been consumed.
    pub fn finish(&self) -> Result<(), TxError> {
        if self.off != self.b.len() {
            return Err(TxError::parse("trailing bytes"));
        }
        Ok(())
    }
}
