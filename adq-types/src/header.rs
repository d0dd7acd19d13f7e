/// Заголовок батча блоков (занимает блок с индексом 0)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    /// Количество блоков данных, следующих за заголовком
    pub num_blocks: u32,
    /// Метка времени каждого блока данных в наносекундах
    /// (монотонные в пределах сессии, порядок совпадает с блоками)
    pub timestamps: Vec<u64>,
}

impl BatchHeader {
    /// Создаёт заголовок по списку меток времени.
    pub fn new(timestamps: Vec<u64>) -> Self {
        Self {
            num_blocks: timestamps.len() as u32,
            timestamps,
        }
    }

    /// Инвариант заголовка: длина `timestamps` равна `num_blocks`.
    pub fn is_consistent(&self) -> bool {
        self.timestamps.len() == self.num_blocks as usize
    }
}
